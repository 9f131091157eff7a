use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::api::DEFAULT_DELAY;

/// Configuration for the application
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Directory holding the storage slot; defaults to ~/.mini-crm
    pub storage_dir: Option<PathBuf>,
    /// Simulated network latency in milliseconds
    pub delay_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize environment variables into Config struct
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Parse environment variables into Config struct
        let config = envy::prefixed("MINI_CRM_").from_env::<Config>()?;

        Ok(config)
    }

    pub fn storage_dir(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".mini-crm"),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DELAY)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    // Ensure .env file is loaded
    dotenv().ok();

    // Load the configuration
    let config = Config::load()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();
        assert_eq!(config.delay(), DEFAULT_DELAY);
        assert!(config.storage_dir().ends_with(".mini-crm"));
    }

    #[test]
    fn explicit_values_win() {
        let config = Config {
            storage_dir: Some(PathBuf::from("/tmp/crm")),
            delay_ms: Some(0),
        };
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/crm"));
        assert_eq!(config.delay(), Duration::ZERO);
    }
}
