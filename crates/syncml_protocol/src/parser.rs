//! Turning raw payloads into [`SyncmlMessage`]s.

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::SyncmlMessage;

/// Parses raw request payloads.
pub trait MessageParser: Send + Sync {
    /// Parses `raw` into a message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedPayload`] if `raw` is not a valid
    /// message.
    fn parse(&self, raw: &[u8]) -> ProtocolResult<SyncmlMessage>;
}

/// Parser for messages that were already parsed and stored as JSON.
///
/// Used by the CLI and test fixtures; an XML front end would implement
/// [`MessageParser`] the same way.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMessageParser;

impl MessageParser for JsonMessageParser {
    fn parse(&self, raw: &[u8]) -> ProtocolResult<SyncmlMessage> {
        serde_json::from_slice(raw).map_err(|e| ProtocolError::malformed(e.to_string()))
    }
}
