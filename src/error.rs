//! Error taxonomy for construction-time failures.
//!
//! Runtime failures inside sinks/formatters never surface as an `Error` —
//! those are always funneled through [`crate::error_relay::ErrorRelay`]
//! (see module docs there). This type only covers failures that propagate
//! straight back to the caller: bad configuration, and the handful of
//! library-internal error kinds that `ErrorRelay` needs a name for.

use std::fmt;

/// Result alias used throughout the crate for fallible, caller-visible operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// `AsyncSink` construction with `queue_size == 0` or `queue_size > MAX_CAPACITY`,
    /// or any other malformed configuration.
    InvalidConfig(String),
    /// A format string and its arguments disagreed; the record that triggered it is dropped.
    FormatError(String),
    /// A downstream sink's `log`/`flush` failed. Carries the sink's own error message;
    /// never propagated to the log call site, only ever passed to `ErrorRelay::handle`.
    SinkError(String),
    /// A failure that carries no more specific information than "something went wrong".
    UnknownError,
    /// The `AsyncSink` worker thread could not be joined on drop.
    ShutdownFailure(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Error::FormatError(msg) => write!(f, "format error: {msg}"),
            Error::SinkError(msg) => write!(f, "sink error: {msg}"),
            Error::UnknownError => write!(f, "unknown error"),
            Error::ShutdownFailure(msg) => write!(f, "shutdown failure: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = Error::InvalidConfig("queue_size must be > 0".into());
        assert!(err.to_string().contains("queue_size must be > 0"));
    }

    #[test]
    fn unknown_error_has_stable_message() {
        assert_eq!(Error::UnknownError.to_string(), "unknown error");
    }
}
