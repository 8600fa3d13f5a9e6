//! Configuration loading and resolution
//!
//! Narrative-collaborator credentials and the default output directory
//! resolve with ENV -> TOML priority: environment variables win, the TOML
//! config file is the fallback, and absence is not an error (the
//! collaborator is optional).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// TOML configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base directory for generated reports and exports
    pub output_dir: Option<PathBuf>,
    /// Narrative analysis (Flow) credentials
    #[serde(default)]
    pub flow: FlowConfig,
}

/// Flow API credential block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant: Option<String>,
    /// Chat model used for narrative generation
    pub model: Option<String>,
}

/// Fully resolved Flow credentials
#[derive(Debug, Clone)]
pub struct FlowCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant: String,
    pub model: String,
}

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Load the TOML config from an explicit path, or from the default
/// location (`<config dir>/tagscope/config.toml`) when present.
///
/// A missing default file yields the default config; a missing explicit
/// path is an error.
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(TomlConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read config {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tagscope").join("config.toml"))
}

/// Resolve Flow credentials with ENV -> TOML priority.
///
/// Returns `None` when no complete credential set is available; the caller
/// degrades to placeholder narrative output.
pub fn resolve_flow_credentials(toml_config: &TomlConfig) -> Option<FlowCredentials> {
    let env_id = std::env::var("TAGSCOPE_FLOW_CLIENT_ID").ok();
    let env_secret = std::env::var("TAGSCOPE_FLOW_CLIENT_SECRET").ok();
    let env_tenant = std::env::var("TAGSCOPE_FLOW_TENANT").ok();

    let env_complete = env_id.is_some() && env_secret.is_some() && env_tenant.is_some();
    let toml_complete = toml_config.flow.client_id.is_some()
        && toml_config.flow.client_secret.is_some()
        && toml_config.flow.tenant.is_some();

    if env_complete && toml_complete {
        warn!("Flow credentials found in both environment and TOML config; using environment");
    }

    let model = std::env::var("TAGSCOPE_FLOW_MODEL")
        .ok()
        .or_else(|| toml_config.flow.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    if env_complete {
        return Some(FlowCredentials {
            client_id: env_id.unwrap_or_default(),
            client_secret: env_secret.unwrap_or_default(),
            tenant: env_tenant.unwrap_or_default(),
            model,
        });
    }

    if toml_complete {
        return Some(FlowCredentials {
            client_id: toml_config.flow.client_id.clone().unwrap_or_default(),
            client_secret: toml_config.flow.client_secret.clone().unwrap_or_default(),
            tenant: toml_config.flow.tenant.clone().unwrap_or_default(),
            model,
        });
    }

    None
}
