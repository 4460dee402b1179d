use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{DEFAULT_DOMESTIC_COUNTRY, DEFAULT_ENCODING};
use crate::error::{Result, RosterError};
use crate::rate_limiter::Limits;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub verifier: VerifierConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    pub base_url: String,
    pub user_id: String,
    pub timeout_seconds: u64,
    pub concurrency: u32,
    pub requests_per_min: Option<u64>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            base_url: "https://secure.shippingapis.com/ShippingAPI.dll".to_string(),
            user_id: String::new(),
            timeout_seconds: 10,
            concurrency: 4,
            requests_per_min: None,
        }
    }
}

impl VerifierConfig {
    pub fn limits(&self) -> Limits {
        Limits {
            requests_per_min: self.requests_per_min,
            concurrency: Some(self.concurrency),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub domestic_country: String,
    pub encoding: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            domestic_country: DEFAULT_DOMESTIC_COUNTRY.to_string(),
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub upload_dir: String,
    pub export_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            upload_dir: "uploads".to_string(),
            export_dir: "exports".to_string(),
        }
    }
}

impl Config {
    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    /// `USPS_USER_ID` overrides `verifier.user_id`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                RosterError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            toml::from_str(&config_content)?
        } else {
            Config::default()
        };

        if let Ok(user_id) = std::env::var("USPS_USER_ID") {
            if !user_id.trim().is_empty() {
                config.verifier.user_id = user_id.trim().to_string();
            }
        }
        Ok(config)
    }
}
