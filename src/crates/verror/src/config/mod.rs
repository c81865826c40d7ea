//! Formatter configuration.
//!
//! Controls how the template renderer reports and bounds faults. The
//! configuration can be built directly, loaded from environment variables or
//! parsed from JSON:
//!
//! ```rust
//! use verror::FormatterConfig;
//!
//! let config = FormatterConfig::new()
//!     .with_warn_on_fault(true)
//!     .with_max_width(4096);
//!
//! let from_json = FormatterConfig::from_json_str(r#"{"warn_on_fault": true}"#).unwrap();
//! assert!(from_json.warn_on_fault);
//! ```
//!
//! | Variable               | Field           |
//! |------------------------|-----------------|
//! | `VERROR_WARN_ON_FAULT` | `warn_on_fault` |
//! | `VERROR_MAX_WIDTH`     | `max_width`     |

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Environment variable for [`FormatterConfig::warn_on_fault`].
pub const ENV_WARN_ON_FAULT: &str = "VERROR_WARN_ON_FAULT";

/// Environment variable for [`FormatterConfig::max_width`].
pub const ENV_MAX_WIDTH: &str = "VERROR_MAX_WIDTH";

/// Ceiling for [`FormatterConfig::max_width`], the largest precision the
/// standard formatter accepts.
pub const MAX_WIDTH_LIMIT: usize = u16::MAX as usize;

static GLOBAL: OnceLock<FormatterConfig> = OnceLock::new();

/// Configuration for template rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterConfig {
    /// Log formatting faults at `WARN` instead of `DEBUG`.
    #[serde(default)]
    pub warn_on_fault: bool,

    /// Largest width or precision a directive may request.
    ///
    /// Never above [`MAX_WIDTH_LIMIT`].
    #[serde(default = "default_max_width")]
    pub max_width: usize,
}

impl FormatterConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            warn_on_fault: false,
            max_width: default_max_width(),
        }
    }

    /// Set whether faults are logged at `WARN`.
    pub fn with_warn_on_fault(mut self, warn: bool) -> Self {
        self.warn_on_fault = warn;
        self
    }

    /// Set the largest accepted width or precision, clamped to
    /// [`MAX_WIDTH_LIMIT`].
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width.min(MAX_WIDTH_LIMIT);
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Unset variables keep their default values.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(ENV_WARN_ON_FAULT) {
            config.warn_on_fault = parse_bool(ENV_WARN_ON_FAULT, &value)?;
        }

        if let Some(value) = lookup(ENV_MAX_WIDTH) {
            config.max_width = value
                .trim()
                .parse()
                .ok()
                .filter(|width| *width <= MAX_WIDTH_LIMIT)
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: ENV_MAX_WIDTH.to_string(),
                    value: value.clone(),
                })?;
        }

        Ok(config)
    }

    /// Parse configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.max_width > MAX_WIDTH_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "max_width".to_string(),
                value: config.max_width.to_string(),
            });
        }
        Ok(config)
    }

    /// Install this configuration as the process-wide default.
    ///
    /// Every [`VError`](crate::VError) construction reads the global
    /// configuration, so call this before the first error is built. Once the
    /// global configuration has been installed or loaded this returns
    /// [`ConfigError::AlreadyInstalled`].
    pub fn install(self) -> Result<()> {
        GLOBAL.set(self).map_err(|_| ConfigError::AlreadyInstalled)
    }

    /// The process-wide configuration.
    ///
    /// Loaded from the environment on first use unless [`install`](Self::install)
    /// ran earlier. An invalid environment is logged and the defaults are used.
    pub fn global() -> &'static FormatterConfig {
        GLOBAL.get_or_init(|| Self::from_vars_or_default(|key| std::env::var(key).ok()))
    }

    fn from_vars_or_default<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_vars(lookup).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Invalid formatter configuration in environment, using defaults");
            Self::new()
        })
    }
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_max_width() -> usize {
    MAX_WIDTH_LIMIT
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
