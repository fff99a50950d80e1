//! Configuration management.
//!
//! Settings come from a TOML file with environment overrides. Every section
//! and field is optional; missing values fall back to the defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [synthesis]
//! papers_to_use = 5
//! papers_to_search = 30
//! relevance_threshold = 7
//! target_words = 250
//!
//! [qa]
//! confidence_threshold = 7
//! force_retrieval = false
//! force_parametric = false
//! max_results = 3
//!
//! [logging]
//! level = "info"
//! format = "plain"   # or "json"
//!
//! [retry]
//! max_attempts = 3
//! initial_delay_ms = 1000
//! ```
//!
//! Environment variables use the `PUBMED_SYNTH` prefix and `__` between
//! path segments, e.g. `PUBMED_SYNTH__SYNTHESIS__PAPERS_TO_USE=8`.

mod settings;

pub use settings::{LogFormat, LoggingConfig, QaConfig, SynthConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::utils::RetrySettings;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PUBMED_SYNTH";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "pubmed-synth.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub synthesis: SynthConfig,

    #[serde(default)]
    pub qa: QaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Backoff for collaborator wrappers
    #[serde(default)]
    pub retry: RetrySettings,
}

impl Config {
    /// Parse a TOML document, then validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    /// Validate the engine sections
    pub fn validate(&self) -> Result<()> {
        self.synthesis.validate()?;
        self.qa.validate()
    }
}

/// Load configuration from a TOML file plus `PUBMED_SYNTH__*` overrides
pub fn load_config(path: &Path) -> Result<Config> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    let config: Config = settings
        .try_deserialize()
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    config.validate()?;

    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Locate a configuration file: `./pubmed-synth.toml`, then the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("pubmed-synth").join("config.toml");
    user.is_file().then_some(user)
}

/// Load the discovered configuration file, or the defaults when there is none
pub fn get_config() -> Result<Config> {
    match find_config_file() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}
