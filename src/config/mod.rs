use crate::core::path::{config_file, ensure_dir};
use crate::core::{AloError, AloResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Whether a new container registers itself under `Container`,
    /// `dyn Resolver` and `dyn Registrar`
    #[serde(default = "default_true")]
    pub self_register: bool,

    /// Default tracing filter, used when `RUST_LOG` is not set
    /// Example: "warn", "alo=debug"
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            self_register: true,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load config from platform-specific config directory, creating default if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\alo\config.yaml
    /// - Linux: ~/.config/alo/config.yaml
    /// - macOS: ~/Library/Application Support/alo/config.yaml
    pub fn load() -> AloResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> AloResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save config to platform-specific config directory
    pub fn save(&self) -> AloResult<()> {
        self.save_to(&config_file()?)
    }

    /// Save config to an explicit file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> AloResult<()> {
        let config_dir = path
            .parent()
            .ok_or_else(|| AloError::Path("Invalid config path".to_string()))?;
        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Tracing filter built from `log_filter`
    pub fn env_filter(&self) -> AloResult<EnvFilter> {
        EnvFilter::try_new(&self.log_filter).map_err(|e| {
            AloError::Config(format!("invalid log_filter '{}': {}", self.log_filter, e))
        })
    }
}
