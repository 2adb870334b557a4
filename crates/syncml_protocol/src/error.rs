//! Error types for the protocol crate.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while reading a parsed SyncML message or writing a reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The raw payload could not be turned into a message.
    #[error("unparseable message: {message}")]
    MalformedPayload {
        /// Description of the parse failure.
        message: String,
    },

    /// A required body element is absent.
    #[error("missing {section} element")]
    MissingSection {
        /// Name of the body element (e.g. `Replace`).
        section: &'static str,
    },

    /// A fixed-position item list is shorter than the protocol requires.
    #[error("{section} carries {actual} items, expected {expected}")]
    MissingItems {
        /// Name of the body element holding the items.
        section: &'static str,
        /// Number of items the protocol requires.
        expected: usize,
        /// Number of items actually present.
        actual: usize,
    },

    /// A header field required by the current phase is absent.
    #[error("missing header field: {field}")]
    MissingHeaderField {
        /// Name of the header field.
        field: &'static str,
    },

    /// The reply document could not be written.
    #[error("cannot encode reply: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },
}

impl ProtocolError {
    /// Create a malformed payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Returns true if the error was caused by the client's message
    /// rather than by reply generation.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, ProtocolError::EncodingFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_items_display() {
        let err = ProtocolError::MissingItems {
            section: "Results",
            expected: 7,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Results"));
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn request_error_classification() {
        assert!(ProtocolError::malformed("bad").is_request_error());
        assert!(ProtocolError::MissingSection { section: "Replace" }.is_request_error());
        assert!(!ProtocolError::encoding_failed("nul byte").is_request_error());
    }
}
