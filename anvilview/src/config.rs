//! Process configuration: a JSON file layered over embedded defaults via
//! the `config` crate, the same "embedded defaults as a built-in source,
//! then an optional user file on top" shape as the teacher's
//! `settings.rs::Settings::config_builder` — format changed from TOML to
//! JSON to match this crate's on-disk key set.

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(rename = "PathToWorld")]
    pub path_to_world: PathBuf,
    #[serde(rename = "WebserverPort")]
    pub webserver_port: u16,
    #[serde(rename = "BackgroundWorkersCount")]
    pub background_workers_count: usize,
    #[serde(rename = "JpegQuality")]
    pub jpeg_quality: u8,
}

impl Settings {
    /// Load defaults embedded at compile time, then overlay `user_config_path`
    /// if it exists. A missing user file is not an error — defaults apply;
    /// a malformed one is fatal at startup.
    pub fn load(user_config_path: Option<&Path>) -> anyhow::Result<Settings> {
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("config_default.json"),
            FileFormat::Json,
        ));
        if let Some(path) = user_config_path {
            if path.is_file() {
                builder = builder.add_source(File::from(path));
            }
        }
        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn region_dir(&self) -> PathBuf {
        self.path_to_world.join("region")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_user_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.webserver_port, 8080);
        assert_eq!(settings.background_workers_count, 4);
        assert_eq!(settings.jpeg_quality, 40);
    }

    #[test]
    fn missing_user_file_falls_back_to_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/anvilview.json"))).unwrap();
        assert_eq!(settings.webserver_port, 8080);
    }
}
