//! Configuration for the notewire client.
//!
//! Loads `${NOTEWIRE_HOME:-~/.notewire}/config.toml` and resolves settings
//! with env > file precedence. The backend endpoint is the one required
//! setting: a missing endpoint is a startup-time fatal error, never a
//! runtime notice.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding the backend endpoint base address.
pub const ENDPOINT_ENV: &str = "NOTEWIRE_ENDPOINT";
/// Env var overriding the credential audience.
pub const AUDIENCE_ENV: &str = "NOTEWIRE_AUDIENCE";
/// Env var overriding the config directory.
pub const HOME_ENV: &str = "NOTEWIRE_HOME";

const DEFAULT_AUDIENCE: &str = "notewire-backend";

/// On-disk config file shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub backend: BackendSection,
}

/// `[backend]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// Base address of the answering service.
    pub endpoint: Option<String>,
    /// Audience requested from the credential supplier.
    pub audience: Option<String>,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend endpoint base address, without a trailing slash.
    pub endpoint: String,
    /// Audience passed to the credential supplier on each submission.
    pub audience: String,
}

impl Config {
    /// Loads and resolves configuration from the default location.
    ///
    /// # Errors
    /// Fails fast when the endpoint is missing or malformed, or the config
    /// file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let file = load_config_file(&config_path()?)?;
        Self::resolve(&file)
    }

    /// Loads and resolves configuration from an explicit file path.
    ///
    /// # Errors
    /// Same failure modes as [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self> {
        let file = load_config_file(path)?;
        Self::resolve(&file)
    }

    /// Resolves a parsed config file against the environment.
    ///
    /// # Errors
    /// Fails when no endpoint is configured anywhere.
    pub fn resolve(file: &ConfigFile) -> Result<Self> {
        let endpoint = resolve_endpoint(
            std::env::var(ENDPOINT_ENV).ok().as_deref(),
            file.backend.endpoint.as_deref(),
        )?;
        let audience = resolve_audience(
            std::env::var(AUDIENCE_ENV).ok().as_deref(),
            file.backend.audience.as_deref(),
        );
        Ok(Self { endpoint, audience })
    }
}

/// Returns the config file path under the notewire config directory.
///
/// # Errors
/// Fails when neither `NOTEWIRE_HOME` nor `HOME` is set.
pub fn config_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(dir).join("config.toml"));
    }
    let home = std::env::var_os("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".notewire").join("config.toml"))
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config at {}", path.display()))
}

/// Resolves the endpoint with precedence: env > config file.
///
/// There is no default endpoint; absence is fatal.
fn resolve_endpoint(env_value: Option<&str>, config_value: Option<&str>) -> Result<String> {
    for candidate in [env_value, config_value].into_iter().flatten() {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            continue;
        }
        url::Url::parse(trimmed)
            .with_context(|| format!("Invalid backend endpoint: {trimmed}"))?;
        return Ok(trimmed.trim_end_matches('/').to_string());
    }
    anyhow::bail!("No backend endpoint configured. Set {ENDPOINT_ENV} or endpoint in [backend].")
}

fn resolve_audience(env_value: Option<&str>, config_value: Option<&str>) -> String {
    [env_value, config_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map_or_else(|| DEFAULT_AUDIENCE.to_string(), ToString::to_string)
}
