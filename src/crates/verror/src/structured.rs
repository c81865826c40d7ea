//! Structured errors with a cause chain and aggregated metadata.
//!
//! A [`VError`] carries three things:
//!
//! - a message rendered once from a printf-style template,
//! - an optional [`Cause`], whose text is appended after `": "`,
//! - an [`Info`] map of metadata, seeded from the cause when the cause is
//!   itself a `VError` and then overlaid with explicitly supplied entries.
//!
//! ```text
//! e1  "original error 1"          {foo: "bar", baz: 1}
//!  ▲
//! e2  "original error 2"          {baz: 2}
//!
//! e2.to_string() == "original error 2: original error 1"
//! info(&e2)      == {foo: "bar", baz: 2}
//! ```
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use verror::{info, Options, VError};
//!
//! let e1 = VError::with_options(
//!     Options::new().with_entry("foo", "bar").with_entry("baz", 1),
//!     "original error %d",
//!     &[json!(1)],
//! );
//! let e2 = VError::with_options(
//!     Options::new().with_cause(e1.into_cause()).with_entry("baz", 2),
//!     "original error 2",
//!     &[],
//! );
//!
//! assert_eq!(e2.to_string(), "original error 2: original error 1");
//! assert_eq!(info(&e2).unwrap(), *json!({"foo": "bar", "baz": 2}).as_object().unwrap());
//! ```

use crate::format::sprintf;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shared reference to the error that caused a [`VError`].
pub type Cause = Arc<dyn Error + Send + Sync + 'static>;

/// Metadata attached to a [`VError`].
pub type Info = Map<String, Value>;

/// Optional inputs for [`VError::with_options`].
///
/// `Options::default()` carries neither a cause nor metadata.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Error to chain as the cause.
    pub cause: Option<Cause>,

    /// Metadata to attach; overrides keys inherited from the cause.
    pub info: Info,
}

impl Options {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cause.
    pub fn with_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Replace the metadata map.
    pub fn with_info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    /// Add one metadata entry.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }
}

/// An error with a rendered message, an optional cause and metadata.
///
/// Immutable once constructed. Cloning shares the cause.
#[derive(Debug, Clone)]
pub struct VError {
    message: String,
    info: Info,
    cause: Option<Cause>,
}

impl VError {
    /// Create an error from a template and its arguments.
    pub fn new(template: &str, args: &[Value]) -> Self {
        Self::build(sprintf(template, args), None, Info::new())
    }

    /// Create an error chained to `cause`.
    ///
    /// When the cause is a `VError` its metadata is adopted as this error's
    /// metadata.
    pub fn with_cause(cause: Option<Cause>, template: &str, args: &[Value]) -> Self {
        let message = sprintf(template, args);
        let info = cause
            .as_deref()
            .and_then(|c| info(c))
            .unwrap_or_default();
        Self::build(message, cause, info)
    }

    /// Create an error from [`Options`].
    ///
    /// Metadata is seeded from the cause (if it is a `VError`) and then
    /// overlaid with `opts.info`.
    pub fn with_options(opts: Options, template: &str, args: &[Value]) -> Self {
        let message = sprintf(template, args);
        let Options { cause, info: explicit } = opts;

        let mut merged = Info::new();
        if let Some(inherited) = cause.as_deref().and_then(|c| info(c)) {
            merged.extend(inherited);
        }
        merged.extend(explicit);

        Self::build(message, cause, merged)
    }

    fn build(rendered: String, cause: Option<Cause>, info: Info) -> Self {
        let message = match &cause {
            Some(cause) => format!("{rendered}: {cause}"),
            None => rendered,
        };

        tracing::trace!(
            has_cause = cause.is_some(),
            info_keys = info.len(),
            "Constructed structured error"
        );

        Self {
            message,
            info,
            cause,
        }
    }

    /// The full rendered message, including the text of every ancestor.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The immediate cause, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Borrowed view of the metadata.
    pub fn metadata(&self) -> &Info {
        &self.info
    }

    /// Wrap this error in a [`Cause`] so it can be chained.
    pub fn into_cause(self) -> Cause {
        Arc::new(self)
    }
}

impl fmt::Display for VError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for VError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }
}

/// Copy of the metadata of `err`, or `None` if `err` is not a [`VError`].
///
/// A [`Cause`] or `Arc<VError>` holding a [`VError`] is looked through, so
/// `info(&cause)` and `info(&*cause)` agree. The returned map is independent
/// of the error.
pub fn info(err: &(dyn Error + 'static)) -> Option<Info> {
    if let Some(e) = err.downcast_ref::<VError>() {
        return Some(e.info.clone());
    }
    if let Some(cause) = err.downcast_ref::<Cause>() {
        return info(&**cause);
    }
    err.downcast_ref::<Arc<VError>>().map(|e| e.info.clone())
}

/// The immediate cause of `err`, if it exposes one.
///
/// Single level; use [`chain`] to walk every ancestor.
pub fn unwrap<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
    err.source()
}

/// Iterate over `err` and each of its ancestors, innermost last.
pub fn chain<'a>(err: &'a (dyn Error + 'static)) -> Chain<'a> {
    Chain { next: Some(err) }
}

/// Iterator returned by [`chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a (dyn Error + 'static)>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a (dyn Error + 'static);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = unwrap(current);
        Some(current)
    }
}
