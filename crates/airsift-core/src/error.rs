//! Error types shared across the airsift workspace.
//!
//! A single taxonomy covers the stream lifecycle (closed link, per-call
//! timeout, use before binding) and content failures from the layered
//! parsers. All failures are reported through return values; nothing inside
//! the core retries on its own.

use thiserror::Error;

/// Result type alias for airsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or parsing a modem-carried response.
#[derive(Debug, Error)]
pub enum Error {
    // Stream lifecycle errors
    /// The peer ended the stream; the modem injected its closed notice.
    ///
    /// Terminal for the current session: the caller must stop reading and
    /// release the link.
    #[error("Connection closed by peer")]
    LinkClosed,

    /// No byte arrived within the configured per-read window.
    ///
    /// Recoverable: the caller may read again or abandon the parse.
    #[error("Read timeout after {duration_ms}ms")]
    ReadTimeout { duration_ms: u64 },

    /// A read was attempted on a reader with no bound link.
    ///
    /// A programming-error class, not expected in correct use.
    #[error("Reader is not bound to a modem link")]
    NotBound,

    // Content errors
    /// The `Date:` header value did not match the expected grammar.
    #[error("Malformed date header: {message}")]
    MalformedDate { message: String },

    /// The byte stream did not contain a decimal number where one was
    /// expected.
    #[error("Malformed number: {message}")]
    MalformedNumber { message: String },
}

impl Error {
    /// Create a new malformed-date error.
    pub fn malformed_date(message: impl Into<String>) -> Self {
        Self::MalformedDate {
            message: message.into(),
        }
    }

    /// Create a new malformed-number error.
    pub fn malformed_number(message: impl Into<String>) -> Self {
        Self::MalformedNumber {
            message: message.into(),
        }
    }

    /// True for the terminal closed-by-peer condition.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::LinkClosed)
    }

    /// True for the recoverable per-read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_display() {
        let error = Error::ReadTimeout { duration_ms: 3000 };
        assert!(error.is_timeout());
        assert_eq!(error.to_string(), "Read timeout after 3000ms");
    }

    #[test]
    fn test_closed_error_display() {
        let error = Error::LinkClosed;
        assert!(error.is_closed());
        assert_eq!(error.to_string(), "Connection closed by peer");
    }

    #[test]
    fn test_malformed_date_helper() {
        let error = Error::malformed_date("timezone PST is not GMT");
        assert!(matches!(error, Error::MalformedDate { .. }));
        assert_eq!(
            error.to_string(),
            "Malformed date header: timezone PST is not GMT"
        );
    }

    #[test]
    fn test_malformed_number_helper() {
        let error = Error::malformed_number("no digits before terminator");
        assert!(matches!(error, Error::MalformedNumber { .. }));
        assert!(!error.is_closed());
        assert!(!error.is_timeout());
    }
}
