//! Layered configuration using figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables (`RECS_*` prefix, `__` separates sections)
//! 2. A TOML file (`recs.toml` in the working directory, or `--config`)
//! 3. Built-in defaults
//!
//! `RECS_DIRECTORY__API_KEY` maps to `directory.api_key`,
//! `RECS_OUTPUT__CSV_PATH` to `output.csv_path`, and so on.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "recs.toml";
const ENV_PREFIX: &str = "RECS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub geocoder: GeocoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where the list of posts lives and how post links are tagged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListingConfig {
    pub url: String,
    /// Class carried by the anchors that link to individual posts.
    pub anchor_class: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            url: "https://ny.eater.com/things-to-do-nyc".to_owned(),
            anchor_class: "c-entry-box--compact__image-wrapper".to_owned(),
        }
    }
}

/// Business directory (Yelp Fusion) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Free-text location sent with every search.
    pub location: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.yelp.com/v3".to_owned(),
            api_key: String::new(),
            location: "new york".to_owned(),
        }
    }
}

/// Reverse geocoder (Mapbox) settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_owned(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub figures_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/recommendations.csv"),
            figures_dir: PathBuf::from("figures"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    pub user_agent: String,
    /// Request timeout. `None` keeps the client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("weekend_recs/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration from defaults, the TOML file and the environment.
    ///
    /// An explicit `path` must exist; the default `recs.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::InvalidValue {
                    field: "config".to_owned(),
                    reason: format!("{} does not exist", path.display()),
                });
            }
        }
        Self::figment(path).extract().map_err(ConfigError::from)
    }

    /// Same as [`Config::load`], reading a `.env` file from the working
    /// directory first if there is one.
    pub fn load_with_dotenv(path: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(path)
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if file.exists() {
            figment = figment.merge(Toml::file(file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Collection talks to both APIs, so both keys must be set.
    pub fn ensure_api_keys(&self) -> Result<(), ConfigError> {
        if self.directory.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "directory.api_key".to_owned(),
                reason: format!("missing; set {ENV_PREFIX}DIRECTORY__API_KEY"),
            });
        }
        if self.geocoder.api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "geocoder.api_key".to_owned(),
                reason: format!("missing; set {ENV_PREFIX}GEOCODER__API_KEY"),
            });
        }
        Ok(())
    }
}
