//! Structured errors with cause chains and aggregated metadata.
//!
//! This crate provides [`VError`], an error value that carries a formatted
//! message, an optional cause and a map of contextual metadata. Wrapping an
//! error keeps its text and its metadata, so the outermost error describes
//! the whole failure.
//!
//! # Modules
//!
//! ## Errors
//!
//! Construction and inspection of structured errors:
//!
//! ```rust
//! use verror::{info, unwrap, verror, verror_with_cause, verror_with_opts, Options};
//!
//! let io: verror::Cause = std::sync::Arc::new(std::io::Error::other("connection reset"));
//!
//! let fetch = verror_with_opts!(
//!     Options::new().with_cause(io).with_entry("host", "db-1").with_entry("attempt", 3),
//!     "fetching %s",
//!     "users"
//! );
//! let request = verror_with_cause!(fetch.into_cause(), "request %d failed", 42);
//!
//! assert_eq!(request.to_string(), "request 42 failed: fetching users: connection reset");
//! assert_eq!(info(&request).unwrap()["host"], "db-1");
//! assert!(unwrap(&request).is_some());
//!
//! let plain = verror!("nothing to see");
//! assert!(unwrap(&plain).is_none());
//! ```
//!
//! ## Formatting (`format`)
//!
//! The printf-style renderer used for every message:
//!
//! ```rust
//! use serde_json::json;
//! use verror::format::{sprintf, try_sprintf};
//!
//! assert_eq!(sprintf("%-6s|%5.2f", &[json!("cpu"), json!(0.5)]), "cpu   | 0.50");
//! assert_eq!(sprintf("%d", &[]), "%!d(MISSING)");
//! assert!(try_sprintf("%d", &[]).is_err());
//! ```
//!
//! ## Config (`config`)
//!
//! [`FormatterConfig`] controls fault logging and width limits. It is read from
//! `VERROR_WARN_ON_FAULT` / `VERROR_MAX_WIDTH` on first use, or installed
//! explicitly:
//!
//! ```rust,ignore
//! use verror::FormatterConfig;
//!
//! FormatterConfig::new().with_warn_on_fault(true).install()?;
//! ```

pub mod config;
pub mod error;
pub mod format;
mod structured;

// Re-export commonly used types
pub use config::FormatterConfig;
pub use error::{ConfigError, FormatFault};
pub use format::Formatter;
pub use serde_json::Value;
pub use structured::{chain, info, unwrap, Cause, Chain, Info, Options, VError};

#[doc(hidden)]
pub mod __private {
    use serde::Serialize;
    use serde_json::Value;

    /// Convert a macro argument into a template argument.
    ///
    /// Values that cannot be represented become `null`.
    pub fn arg<T: Serialize + ?Sized>(value: &T) -> Value {
        serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Template argument is not representable, using null");
            Value::Null
        })
    }
}

/// Create a [`VError`] from a template and arguments.
///
/// Arguments can be any `serde::Serialize` value; each one is converted with
/// `serde_json::to_value`. A value JSON cannot represent (for example a
/// `u128` above `u64::MAX`) becomes `null`, so the directive renders its null
/// fallback such as `%!d(<nil>)`.
///
/// ```rust
/// let err = verror::verror!("error %d message %s", 17, "msg");
/// assert_eq!(err.to_string(), "error 17 message msg");
///
/// let err = verror::verror!("%d", 1u128 << 100);
/// assert_eq!(err.to_string(), "%!d(<nil>)");
/// ```
#[macro_export]
macro_rules! verror {
    ($template:expr $(, $arg:expr)* $(,)?) => {
        $crate::VError::new($template, &[$($crate::__private::arg(&$arg)),*])
    };
}

/// Create a [`VError`] chained to a cause.
///
/// The cause is a [`Cause`] or an `Option<Cause>`.
///
/// ```rust
/// use std::sync::Arc;
///
/// let cause: verror::Cause = Arc::new(std::io::Error::other("original error"));
/// let err = verror::verror_with_cause!(cause, "new %d error", 17);
/// assert_eq!(err.to_string(), "new 17 error: original error");
/// ```
#[macro_export]
macro_rules! verror_with_cause {
    ($cause:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::VError::with_cause(
            ::core::option::Option::<$crate::Cause>::from($cause),
            $template,
            &[$($crate::__private::arg(&$arg)),*],
        )
    };
}

/// Create a [`VError`] from [`Options`].
///
/// ```rust
/// use verror::Options;
///
/// let err = verror::verror_with_opts!(Options::new().with_entry("foo", "bar"), "error message");
/// assert_eq!(verror::info(&err).unwrap()["foo"], "bar");
/// ```
#[macro_export]
macro_rules! verror_with_opts {
    ($opts:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::VError::with_options($opts, $template, &[$($crate::__private::arg(&$arg)),*])
    };
}
