//! External HTTP surface — specified only for completeness, out of the
//! core decode/render pipeline. Three thin JSON routes over the cache
//! directory a `render` run has already populated; `serve` never touches
//! the world's region files or texture assets.
//!
//! `actix-web` is in the corpus only as a declared dependency of
//! `nhatnxbk-voxelize` (no usable route-handler source survives in the
//! retrieval pack), so this follows `actix-web`'s own documented
//! `App::new().route(...)` shape rather than imitating a specific file.

use actix_web::{web, App, HttpResponse, HttpServer};
use serde::{Deserialize, Serialize};

use crate::cache::DiskCache;
use crate::coords::RegionCoord;
use crate::scheduler::order_by_proximity;

/// Everything `serve` needs, all of it read from the cache directory a
/// prior `render` run produced.
pub struct ServeContext {
    pub cache: DiskCache,
}

#[derive(Serialize)]
struct RegionPos {
    #[serde(rename = "PosX")]
    pos_x: i32,
    #[serde(rename = "PosZ")]
    pos_z: i32,
}

#[derive(Deserialize)]
struct BlockDataQuery {
    region_x: i32,
    region_z: i32,
}

/// `GET /regionslist` — every region with a cached grid artifact, proximity-sorted.
async fn regionslist(ctx: web::Data<ServeContext>) -> HttpResponse {
    let ordered = order_by_proximity(ctx.cache.cached_regions());
    let body: Vec<RegionPos> = ordered
        .into_iter()
        .map(|r| RegionPos {
            pos_x: r.x,
            pos_z: r.z,
        })
        .collect();
    HttpResponse::Ok().json(body)
}

/// `GET /palette` — index to block name, read from the palette artifact a
/// render run left behind; an empty object if nothing has been rendered yet.
async fn palette(ctx: web::Data<ServeContext>) -> HttpResponse {
    match ctx.cache.read_palette() {
        Ok(Some(map)) => HttpResponse::Ok().json(map),
        Ok(None) => HttpResponse::Ok().json(std::collections::HashMap::<u16, String>::new()),
        Err(err) => {
            log::warn!("palette cache read failed: {err}");
            HttpResponse::Ok().json(std::collections::HashMap::<u16, String>::new())
        }
    }
}

/// `GET /blockdata?region_x=&region_z=` — the cached grid, or `[]` on miss.
/// Never decodes on demand; this route only ever serves what a prior
/// `render` run has already cached.
async fn blockdata(
    ctx: web::Data<ServeContext>,
    query: web::Query<BlockDataQuery>,
) -> HttpResponse {
    let region = RegionCoord::new(query.region_x, query.region_z);
    match ctx.cache.read_grid(region) {
        Ok(Some(grid)) => HttpResponse::Ok().json(grid.as_slice()),
        Ok(None) => HttpResponse::Ok().json(Vec::<u16>::new()),
        Err(err) => {
            log::warn!("blockdata cache read failed for {region}: {err}");
            HttpResponse::Ok().json(Vec::<u16>::new())
        }
    }
}

pub async fn serve(ctx: ServeContext, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(ctx);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/regionslist", web::get().to(regionslist))
            .route("/palette", web::get().to(palette))
            .route("/blockdata", web::get().to(blockdata))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
