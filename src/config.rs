//! Gateway configuration
//!
//! Global defaults merged into per-call options. Loaded from a JSON file;
//! every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for [`GatewayConfig`]
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Default cache directives applied to every call
///
/// Values are kept as given; non-integers are ignored when merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDefaults {
    #[serde(default)]
    pub max_age: Option<Value>,
    #[serde(default)]
    pub s_max_age: Option<Value>,
}

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Honor the `_debug` query parameter (default: true)
    #[serde(default = "default_debug_enabled")]
    pub debug_enabled: bool,

    /// Cache directives used when a statement declares none
    #[serde(default)]
    pub cache_control: CacheDefaults,
}

fn default_debug_enabled() -> bool {
    true
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            debug_enabled: default_debug_enabled(),
            cache_control: CacheDefaults::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON text
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
