use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use anvilview::config::Settings;
use anvilview::http::{self, ServeContext};
use anvilview::palette::PaletteRegistry;
use anvilview::raster::TextureAtlas;
use anvilview::scheduler::{self, PipelineContext};
use anvilview::cache::DiskCache;

#[derive(Debug, Parser)]
struct Args {
    /// Path to the JSON config file. Defaults are used for any key the file
    /// omits, or if the file is absent entirely.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Directory of `*.png` block textures. Required for `render`; `serve`
    /// never reads it, since it only ever serves what a prior `render` run
    /// already cached.
    #[arg(short, long)]
    textures: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the worker pool once over every region currently on disk, then exit.
    Render,
    /// Serve the HTTP surface from a prior `render` run's cache directory.
    /// Does not require the world's region files or the texture assets.
    Serve,
}

#[actix_web::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    log::debug!("args: {:?}", args);

    let settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Render => {
            let textures = args
                .textures
                .context("--textures is required for the render subcommand")?;
            let palette = PaletteRegistry::from_textures_dir(&textures)?;
            log::info!("loaded {} block textures", palette.len());
            let atlas = TextureAtlas::load(&textures, &palette)?;
            let cache = DiskCache::new(settings.path_to_world.join("cache"));

            let ctx = Arc::new(PipelineContext {
                world_region_dir: settings.region_dir(),
                palette,
                atlas,
                cache,
                jpeg_quality: settings.jpeg_quality,
            });

            let regions = scheduler::scan_region_dir(&ctx.world_region_dir);
            let ordered = scheduler::order_by_proximity(regions);
            log::info!("dispatching {} regions", ordered.len());
            scheduler::run(Arc::clone(&ctx), ordered, settings.background_workers_count);

            // `run` above joins every worker before returning, so `ctx` is
            // back down to its single owning reference here.
            let ctx = Arc::try_unwrap(ctx)
                .unwrap_or_else(|_| panic!("worker pool should have released its context"));
            ctx.cache.write_palette(&ctx.palette.to_index_map())?;
            Ok(())
        }
        Command::Serve => {
            let cache = DiskCache::new(settings.path_to_world.join("cache"));
            http::serve(ServeContext { cache }, settings.webserver_port).await?;
            Ok(())
        }
    }
}
