// crates/sut-control-config/src/config.rs
// ============================================================================
// Module: Controller Configuration
// Description: Configuration loading and validation for the controller.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits and
//! unknown fields rejected. Missing or invalid configuration fails closed so
//! a controller is never served against a half-specified SUT.
//! Security posture: config inputs are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "sut-control.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SUT_CONTROL_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Default controller bind address.
const DEFAULT_BIND: &str = "127.0.0.1:40100";
/// Default maximum request body size for the controller service.
const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Maximum allowed request body size for the controller service.
pub(crate) const MAX_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default SUT health probe path.
const DEFAULT_HEALTH_PATH: &str = "/health";
/// Default SUT reset hook path.
const DEFAULT_RESET_PATH: &str = "/reset";
/// Default SUT hook request timeout in milliseconds.
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;
/// Minimum SUT hook request timeout in milliseconds.
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum SUT hook request timeout in milliseconds.
pub(crate) const MAX_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default readiness window in milliseconds.
const DEFAULT_READINESS_TIMEOUT_MS: u64 = 5_000;
/// Minimum readiness window in milliseconds.
pub(crate) const MIN_READINESS_TIMEOUT_MS: u64 = 100;
/// Maximum readiness window in milliseconds.
pub(crate) const MAX_READINESS_TIMEOUT_MS: u64 = 60_000;
/// Default readiness poll interval in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 50;
/// Minimum readiness poll interval in milliseconds.
pub(crate) const MIN_POLL_INTERVAL_MS: u64 = 10;
/// Maximum readiness poll interval in milliseconds.
pub(crate) const MAX_POLL_INTERVAL_MS: u64 = 5_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while loading or validating configuration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level controller configuration.
///
/// # Invariants
/// - `validate` has been called before the config is used to build a
///   controller service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    /// Controller service settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Managed SUT settings.
    pub sut: SutConfig,
}

impl ControllerConfig {
    /// Loads configuration from the given path, the `SUT_CONTROL_CONFIG`
    /// environment variable, or the default filename, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_config_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration, failing closed on any inconsistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.sut.validate()
    }
}

/// Controller service settings.
///
/// # Invariants
/// - `bind` parses as a socket address.
/// - `max_body_bytes` stays within the hard upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address the controller service binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid(format!("server.bind is not a socket address: {}", self.bind)))?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_MAX_BODY_BYTES {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be within 1..={MAX_MAX_BODY_BYTES}"
            )));
        }
        Ok(())
    }
}

/// Selection of how the controller reaches its SUT.
///
/// # Invariants
/// - Variants are stable for TOML parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SutMode {
    /// Address a SUT that was started independently.
    Remote,
    /// Spawn and manage the SUT as a child process.
    Process,
}

/// Managed SUT settings.
///
/// # Invariants
/// - `base_url` is required and must be an absolute HTTP(S) URL.
/// - `command` is required for [`SutMode::Process`] and rejected for
///   [`SutMode::Remote`].
/// - Hook paths are absolute (`/`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SutConfig {
    /// How the controller reaches the SUT.
    pub mode: SutMode,
    /// Base URL of the SUT's externally reachable API.
    pub base_url: String,
    /// Command line used to spawn a process-managed SUT.
    #[serde(default)]
    pub command: Vec<String>,
    /// Environment variables passed to a process-managed SUT.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Health probe path on the SUT.
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// Reset hook path on the SUT.
    #[serde(default = "default_reset_path")]
    pub reset_path: String,
    /// Optional shutdown hook path on the SUT.
    #[serde(default)]
    pub shutdown_path: Option<String>,
    /// Timeout for individual hook requests, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Readiness polling settings.
    #[serde(default)]
    pub readiness: ReadinessConfig,
}

impl SutConfig {
    /// Validates SUT settings against the selected mode.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("sut.base_url is invalid: {err}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "sut.base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        match self.mode {
            SutMode::Process => {
                if self.command.is_empty() {
                    return Err(ConfigError::Invalid(
                        "sut.command is required for process mode".to_string(),
                    ));
                }
            }
            SutMode::Remote => {
                if !self.command.is_empty() {
                    return Err(ConfigError::Invalid(
                        "sut.command is not allowed for remote mode".to_string(),
                    ));
                }
            }
        }
        validate_hook_path("sut.health_path", &self.health_path)?;
        validate_hook_path("sut.reset_path", &self.reset_path)?;
        if let Some(path) = &self.shutdown_path {
            validate_hook_path("sut.shutdown_path", path)?;
        }
        if self.request_timeout_ms < MIN_REQUEST_TIMEOUT_MS
            || self.request_timeout_ms > MAX_REQUEST_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "sut.request_timeout_ms must be within \
                 {MIN_REQUEST_TIMEOUT_MS}..={MAX_REQUEST_TIMEOUT_MS}"
            )));
        }
        self.readiness.validate()
    }
}

/// Readiness polling settings for SUT boots.
///
/// # Invariants
/// - The poll interval never exceeds the readiness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadinessConfig {
    /// Maximum time to wait for the SUT to become ready, in milliseconds.
    #[serde(default = "default_readiness_timeout_ms")]
    pub timeout_ms: u64,
    /// Interval between readiness checks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_readiness_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ReadinessConfig {
    /// Validates readiness bounds.
    fn validate(self) -> Result<(), ConfigError> {
        if self.timeout_ms < MIN_READINESS_TIMEOUT_MS || self.timeout_ms > MAX_READINESS_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "sut.readiness.timeout_ms must be within \
                 {MIN_READINESS_TIMEOUT_MS}..={MAX_READINESS_TIMEOUT_MS}"
            )));
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS
            || self.poll_interval_ms > MAX_POLL_INTERVAL_MS
        {
            return Err(ConfigError::Invalid(format!(
                "sut.readiness.poll_interval_ms must be within \
                 {MIN_POLL_INTERVAL_MS}..={MAX_POLL_INTERVAL_MS}"
            )));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(ConfigError::Invalid(
                "sut.readiness.poll_interval_ms exceeds timeout_ms".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the effective config path from argument, env var, or default.
fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(value) = env::var(CONFIG_ENV_VAR)
        && !value.is_empty()
    {
        return PathBuf::from(value);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

/// Ensures a hook path is absolute.
fn validate_hook_path(field: &str, path: &str) -> Result<(), ConfigError> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{field} must start with '/': {path}")))
    }
}

/// Returns the default bind address.
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

/// Returns the default maximum body size.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Returns the default health probe path.
fn default_health_path() -> String {
    DEFAULT_HEALTH_PATH.to_string()
}

/// Returns the default reset hook path.
fn default_reset_path() -> String {
    DEFAULT_RESET_PATH.to_string()
}

/// Returns the default hook request timeout.
const fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

/// Returns the default readiness window.
const fn default_readiness_timeout_ms() -> u64 {
    DEFAULT_READINESS_TIMEOUT_MS
}

/// Returns the default readiness poll interval.
const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
