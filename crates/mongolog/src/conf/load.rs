//! Load — config loading from file and environment variables.

use std::fs;
use std::path::Path;

use thiserror::Error;

use super::model::{Config, ParserConfig};

pub const CONFIG_FILE_ENV: &str = "MONGOLOG_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/mongolog/mongolog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration.
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_FILE_ENV).ok();

        let mut config = match path.or(env_path.as_deref()) {
            Some(explicit) => {
                tracing::info!("Loading configuration from: {}", explicit);
                Self::from_file(explicit)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No config file at {}, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_env();
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_string(),
            source,
        })
    }

    /// Environment variables override file settings
    fn apply_env(&mut self) {
        if let Some(policy) = env_parse("MONGOLOG_ON_ERROR") {
            self.on_error = policy;
        }
        self.parser.apply_env();
    }

    pub fn validate(&self) -> Result<(), String> {
        self.parser.validate()
    }
}

impl ParserConfig {
    fn apply_env(&mut self) {
        if let Some(size) = env_parse("MONGOLOG_MAX_LINE_SIZE") {
            self.max_line_size = size;
        }
        if let Some(normalize) = env_parse("MONGOLOG_NORMALIZE") {
            self.normalize_queries = normalize;
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring unparseable {}={}", key, raw);
            None
        }
    }
}
