// crates/primary-user-config/src/config.rs
// ============================================================================
// Module: Primary User Sync Configuration
// Description: Configuration loading and validation for Primary User Sync.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path is resolved from the command line, then the
//! `PRIMARY_USER_SYNC_CONFIG` environment variable, then
//! `primary-user-sync.toml` in the working directory. When no path was given
//! and the default file is absent, built-in defaults apply; an explicitly
//! named file that cannot be read is an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "primary-user-sync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PRIMARY_USER_SYNC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 120_000;
/// Maximum response body size in bytes.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum number of pages followed per paged collection.
pub const MAX_PAGES: u32 = 10_000;
/// Maximum sign-in window the audit log retains, in days.
pub const MAX_WINDOW_DAYS: u32 = 30;
/// Maximum length of a report file prefix.
const MAX_FILE_PREFIX_LENGTH: usize = 64;
/// Maximum length of the sign-in application filter.
const MAX_APP_FILTER_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Primary User Sync configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    /// Remote API configuration.
    #[serde(default)]
    pub graph: GraphConfig,
    /// Sign-in telemetry window configuration.
    #[serde(default)]
    pub signins: SignInConfig,
    /// Report output configuration.
    #[serde(default)]
    pub report: ReportConfig,
    /// Audit log routing.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Path the configuration was loaded from, if any (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl SyncConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            let mut config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.graph.validate()?;
        self.signins.validate()?;
        self.report.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Remote API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Base URL of the directory and device-management API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Maximum pages followed per paged collection.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Allow cleartext HTTP base URLs (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            max_pages: default_max_pages(),
            allow_http: false,
            user_agent: default_user_agent(),
        }
    }
}

impl GraphConfig {
    /// Validates remote API configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("graph.base_url is invalid: {err}")))?;
        match url.scheme() {
            "https" => {}
            "http" if self.allow_http => {}
            "http" => {
                return Err(ConfigError::Invalid(
                    "graph.base_url uses http:// without allow_http".to_string(),
                ));
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "graph.base_url has unsupported scheme: {other}"
                )));
            }
        }
        if url.host_str().is_none() {
            return Err(ConfigError::Invalid("graph.base_url must include a host".to_string()));
        }
        let token_env = self.token_env.trim();
        if token_env.is_empty() {
            return Err(ConfigError::Invalid("graph.token_env must be non-empty".to_string()));
        }
        if token_env.contains('=') || token_env.contains('\0') {
            return Err(ConfigError::Invalid(
                "graph.token_env is not a valid variable name".to_string(),
            ));
        }
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "graph.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "graph.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES}"
            )));
        }
        if self.max_pages == 0 || self.max_pages > MAX_PAGES {
            return Err(ConfigError::Invalid(format!(
                "graph.max_pages must be between 1 and {MAX_PAGES}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("graph.user_agent must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Sign-in telemetry window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInConfig {
    /// Application the sign-ins are restricted to; empty disables the filter.
    #[serde(default = "default_app_filter")]
    pub app_filter: String,
    /// Trailing window length in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            app_filter: default_app_filter(),
            window_days: default_window_days(),
        }
    }
}

impl SignInConfig {
    /// Returns the application filter, or `None` when disabled.
    #[must_use]
    pub fn app_filter(&self) -> Option<&str> {
        let trimmed = self.app_filter.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }

    /// Validates sign-in window configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_window_days(self.window_days)?;
        if self.app_filter.len() > MAX_APP_FILTER_LENGTH {
            return Err(ConfigError::Invalid("signins.app_filter exceeds max length".to_string()));
        }
        Ok(())
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Report file name prefix.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl ReportConfig {
    /// Validates report configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("report.output_dir", &self.output_dir)?;
        let prefix = self.file_prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("report.file_prefix must be non-empty".to_string()));
        }
        if prefix.len() > MAX_FILE_PREFIX_LENGTH {
            return Err(ConfigError::Invalid("report.file_prefix exceeds max length".to_string()));
        }
        if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')) {
            return Err(ConfigError::Invalid(
                "report.file_prefix may contain only letters, digits, '-', '_' and '.'"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit log destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Audit log configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Audit destination.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines); required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("audit.path", path)?;
        }
        if self.sink == AuditSinkKind::File && self.path.is_none() {
            return Err(ConfigError::Invalid("audit.sink = \"file\" requires audit.path".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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
// SECTION: Helpers
// ============================================================================

/// Validates a sign-in window length in days.
///
/// # Errors
///
/// Returns [`ConfigError`] when the window is outside `1..=30`.
pub fn validate_window_days(window_days: u32) -> Result<(), ConfigError> {
    if window_days == 0 || window_days > MAX_WINDOW_DAYS {
        return Err(ConfigError::Invalid(format!(
            "signins.window_days must be between 1 and {MAX_WINDOW_DAYS}"
        )));
    }
    Ok(())
}

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default API base URL.
fn default_base_url() -> String {
    "https://graph.microsoft.com/beta".to_string()
}

/// Default environment variable holding the bearer token.
fn default_token_env() -> String {
    "PRIMARY_USER_SYNC_TOKEN".to_string()
}

/// Default request timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    5_000
}

/// Default maximum response body size in bytes.
const fn default_max_response_bytes() -> usize {
    8 * 1024 * 1024
}

/// Default page cap per paged collection.
const fn default_max_pages() -> u32 {
    500
}

/// Default user agent, versioned with the package.
fn default_user_agent() -> String {
    format!("primary-user-sync/{}", env!("CARGO_PKG_VERSION"))
}

/// Default sign-in application filter.
fn default_app_filter() -> String {
    "Windows Sign In".to_string()
}

/// Default sign-in window, the full retention period.
const fn default_window_days() -> u32 {
    MAX_WINDOW_DAYS
}

/// Default report directory.
fn default_output_dir() -> String {
    ".".to_string()
}

/// Default report file name prefix.
fn default_file_prefix() -> String {
    "PrimaryUserSync".to_string()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
