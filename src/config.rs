use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_ENV: &str = "LIVE_MAP_CONFIG";
const LOCAL_CONFIG: &str = "live-map.toml";
const APP_DIR: &str = "live-map-viewer";
const CONFIG_FILE_NAME: &str = "config.toml";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory receiving `map.html`.
    pub output_dir: PathBuf,
    /// Folder scanned for custom marker icons.
    pub icons_dir: PathBuf,
    pub map_center: [f64; 2],
    pub map_zoom: u8,
    pub imagery: ImageryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            icons_dir: PathBuf::from("icons"),
            map_center: [0.0, 0.0],
            map_zoom: 2,
            imagery: ImageryConfig::default(),
        }
    }
}

/// Sentinel-2 WMS overlay and its OAuth2 client-credentials endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageryConfig {
    pub token_url: String,
    pub wms_url: String,
    pub instance_id: String,
    pub layer: String,
    pub max_cloud_cover: u8,
    /// Used when no date-time was chosen.
    pub fallback_datetime: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            token_url: "https://services.sentinel-hub.com/oauth/token".to_string(),
            wms_url: "https://services.sentinel-hub.com/ogc/wms".to_string(),
            instance_id: String::new(),
            layer: "TRUE-COLOR-S2L2A".to_string(),
            max_cloud_cover: 20,
            fallback_datetime: "2024-01-01T00:00:00Z".to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl Config {
    /// Load from the first config file found, then apply environment
    /// overrides for the imagery credentials.
    ///
    /// Lookup: `$LIVE_MAP_CONFIG`, `./live-map.toml`,
    /// `<config dir>/live-map-viewer/config.toml`.  No file means defaults.
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate() {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
            .filter(|p| p.exists())
    }

    /// Secrets come from the environment rather than the file when set.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var("LIVE_MAP_CLIENT_ID") {
            self.imagery.client_id = Some(id);
        }
        if let Some(secret) = var("LIVE_MAP_CLIENT_SECRET") {
            self.imagery.client_secret = Some(secret);
        }
        if let Some(instance) = var("LIVE_MAP_INSTANCE_ID") {
            self.imagery.instance_id = instance;
        }
    }

    pub fn map_path(&self) -> PathBuf {
        self.output_dir.join("map.html")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "output_dir = \"/tmp/maps\"\n[imagery]\ninstance_id = \"abc\"\nmax_cloud_cover = 35"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/maps"));
        assert_eq!(config.map_zoom, 2);
        assert_eq!(config.imagery.instance_id, "abc");
        assert_eq!(config.imagery.max_cloud_cover, 35);
        assert_eq!(config.imagery.layer, "TRUE-COLOR-S2L2A");
        assert_eq!(config.map_path(), PathBuf::from("/tmp/maps/map.html"));
    }

    #[test]
    fn environment_overrides_credentials() {
        let mut config = Config::default();
        config.imagery.client_id = Some("from-file".into());
        config.apply_env(|key| match key {
            "LIVE_MAP_CLIENT_ID" => Some("from-env".into()),
            "LIVE_MAP_CLIENT_SECRET" => Some("s3cret".into()),
            _ => None,
        });
        assert_eq!(config.imagery.client_id.as_deref(), Some("from-env"));
        assert_eq!(config.imagery.client_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.imagery.instance_id, "");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "map_zoom = \"far\"").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }
}
