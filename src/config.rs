use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::fee::DEFAULT_FEE_RATE;
use crate::money::Decimal;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Fee rate must not be negative, got {0}")]
    NegativeFeeRate(Decimal),

    #[error("No PostgreSQL URL: set postgres_url or DATABASE_URL")]
    MissingDatabaseUrl,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    /// Transfer fee in percent of the amount
    #[serde(default = "default_fee_rate")]
    pub fee_rate: Decimal,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL. `DATABASE_URL` wins when set.
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub postgres_max_connections: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

fn default_fee_rate() -> Decimal {
    Decimal::parse(DEFAULT_FEE_RATE).unwrap_or(Decimal::ZERO)
}

fn default_max_connections() -> u32 {
    10
}

impl AppConfig {
    /// Load `config/{env}.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: config_path,
            source,
        })?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                config.postgres_url = Some(url);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fee_rate < Decimal::ZERO {
            return Err(ConfigError::NegativeFeeRate(self.fee_rate));
        }
        Ok(())
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.postgres_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}
