//! Error types for the crate's own fallible helpers.
//!
//! Constructing a [`VError`](crate::VError) never fails. The types here only
//! cover the helpers around it: loading a [`FormatterConfig`](crate::FormatterConfig)
//! and strict template rendering through [`try_sprintf`](crate::format::try_sprintf).

use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or installing formatter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    /// JSON configuration could not be deserialized.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The global configuration was already set.
    #[error("Formatter configuration is already installed")]
    AlreadyInstalled,
}

/// A problem found while rendering a template.
///
/// The `Display` form of each variant is exactly the text the lenient
/// renderer writes in place of the offending directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatFault {
    /// A verb had no argument left to consume.
    #[error("%!{verb}(MISSING)")]
    MissingArgument { verb: char },

    /// The argument's kind does not fit the verb, or the verb is unknown.
    #[error("%!{verb}({kind}={value})")]
    BadArgument {
        verb: char,
        kind: &'static str,
        value: String,
    },

    /// A typed verb received a null argument.
    #[error("%!{verb}(<nil>)")]
    NullArgument { verb: char },

    /// The template ended in the middle of a directive.
    #[error("%!(NOVERB)")]
    NoVerb,

    /// Width exceeded the configured maximum.
    #[error("%!(BADWIDTH)")]
    BadWidth,

    /// Precision exceeded the configured maximum.
    #[error("%!(BADPREC)")]
    BadPrecision,

    /// Arguments were left over after the last directive.
    #[error("%!(EXTRA {0})")]
    ExtraArguments(String),
}
