/*!
 * Semihosting Configuration
 *
 * Session-wide switches for the dispatcher and its backend.
 */

use serde::{Deserialize, Serialize};
use std::env;

use crate::core::errors::ConfigError;
use crate::core::limits::{DEFAULT_FILE_MODE, DEFAULT_MAX_STRING_LENGTH};

pub const ENV_SYSTEM_CALLS: &str = "SEMIHOST_SYSTEM_CALLS";
pub const ENV_REDIRECT_CONSOLE: &str = "SEMIHOST_REDIRECT_CONSOLE";
pub const ENV_FILE_MODE: &str = "SEMIHOST_FILE_MODE";
pub const ENV_MAX_STRING: &str = "SEMIHOST_MAX_STRING";

/// Dispatcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemihostingConfig {
    /// Relay `system` to the front-end (default: false)
    pub system_calls_allowed: bool,

    /// Stream relayed stdout/stderr writes to a local sink (default: false)
    pub redirect_console: bool,

    /// Permission bits for files created by open (default: 0644)
    pub file_mode: u32,

    /// Upper bound for NUL-terminated string scans (default: 64 KiB)
    pub max_string_length: u32,
}

impl SemihostingConfig {
    pub fn new() -> Self {
        Self {
            system_calls_allowed: false,
            redirect_console: false,
            file_mode: DEFAULT_FILE_MODE,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
        }
    }

    /// Everything enabled (trusted bench setups)
    pub fn permissive() -> Self {
        Self {
            system_calls_allowed: true,
            ..Self::new()
        }
    }

    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Defaults overridden by `SEMIHOST_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        if let Some(value) = lookup(ENV_SYSTEM_CALLS) {
            config.system_calls_allowed = parse_bool(ENV_SYSTEM_CALLS, &value)?;
        }
        if let Some(value) = lookup(ENV_REDIRECT_CONSOLE) {
            config.redirect_console = parse_bool(ENV_REDIRECT_CONSOLE, &value)?;
        }
        if let Some(value) = lookup(ENV_FILE_MODE) {
            config.file_mode = u32::from_str_radix(value.trim(), 8)
                .ok()
                .filter(|mode| *mode <= 0o7777)
                .ok_or_else(|| invalid(ENV_FILE_MODE, &value))?;
        }
        if let Some(value) = lookup(ENV_MAX_STRING) {
            config.max_string_length = value
                .trim()
                .parse()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| invalid(ENV_MAX_STRING, &value))?;
        }
        Ok(config)
    }

    pub fn with_system_calls(mut self, allowed: bool) -> Self {
        self.system_calls_allowed = allowed;
        self
    }

    pub fn with_console_redirect(mut self, redirect: bool) -> Self {
        self.redirect_console = redirect;
        self
    }

    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    pub fn with_max_string_length(mut self, limit: u32) -> Self {
        self.max_string_length = limit;
        self
    }
}

impl Default for SemihostingConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
