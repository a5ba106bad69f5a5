//! Startup configuration. Cost parameters for new credentials come from a
//! JSON file so deployments can raise them without a rebuild; existing
//! credentials keep verifying because each one records its own parameters.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::crypto::error::CryptoError;
use crate::crypto::params::HashParameters;
use crate::crypto::passwords::CredentialHasher;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "TODO_CREDENTIALS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCredentialsConfig {
    #[serde(rename = "hashParameters", default)]
    pub hash_parameters: HashParameters,
    #[serde(rename = "logLevel")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub parameters: HashParameters,
    pub log_level: Option<String>,
}

impl RuntimeConfig {
    pub fn hasher(&self) -> Result<CredentialHasher, CryptoError> {
        CredentialHasher::new(self.parameters)
    }
}

/// Loads and validates the JSON configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<RuntimeConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let raw_config: RawCredentialsConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;

    raw_config
        .hash_parameters
        .validate()
        .map_err(|e| ConfigError::Invalid(format!("{e}")))?;

    Ok(RuntimeConfig {
        parameters: raw_config.hash_parameters,
        log_level: raw_config.log_level,
    })
}

/// Loads the file named by [`CONFIG_ENV`], or returns defaults when unset.
pub fn load_from_env() -> Result<RuntimeConfig, ConfigError> {
    resolve_config(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

fn resolve_config(path: Option<PathBuf>) -> Result<RuntimeConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(RuntimeConfig::default()),
    }
}
