//! Parsed SyncML request messages.
//!
//! A [`SyncmlMessage`] is the structured form of one client payload. Turning
//! raw XML into this tree is the job of an external parser; this crate only
//! reads it.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};

/// A parsed SyncML request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncmlMessage {
    /// The `SyncHdr` element.
    pub header: SyncmlHeader,
    /// The `SyncBody` element.
    #[serde(default)]
    pub body: SyncmlBody,
}

impl SyncmlMessage {
    /// Creates a message with an empty body.
    pub fn new(header: SyncmlHeader) -> Self {
        Self {
            header,
            body: SyncmlBody::default(),
        }
    }

    /// Sets the body.
    pub fn with_body(mut self, body: SyncmlBody) -> Self {
        self.body = body;
        self
    }

    /// Returns the device identity URI of the sender.
    pub fn device_uri(&self) -> &str {
        &self.header.source.loc_uri
    }

    /// Returns the device identity URI, failing if the header leaves it empty.
    pub fn require_device_uri(&self) -> ProtocolResult<&str> {
        if self.header.source.loc_uri.is_empty() {
            return Err(ProtocolError::MissingHeaderField {
                field: "Source/LocURI",
            });
        }
        Ok(&self.header.source.loc_uri)
    }

    /// Returns the user identity of the sender.
    pub fn user(&self) -> &str {
        &self.header.source.loc_name
    }

    /// Returns the alert data, if the body carries an alert.
    pub fn alert_data(&self) -> Option<&str> {
        self.body.alert.as_ref().map(|a| a.data.as_str())
    }
}

/// The `SyncHdr` of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncmlHeader {
    /// Session id, incremented by the client per management session.
    pub session_id: u32,
    /// Message id within the session.
    pub msg_id: u32,
    /// Sender of the message (the device).
    pub source: Source,
    /// Recipient of the message (the server endpoint).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Target>,
    /// Credential presented by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl SyncmlHeader {
    /// Creates a header for the given counters and sender.
    pub fn new(session_id: u32, msg_id: u32, source: Source) -> Self {
        Self {
            session_id,
            msg_id,
            source,
            target: None,
            credential: None,
        }
    }

    /// Sets the target URI.
    pub fn with_target(mut self, loc_uri: impl Into<String>) -> Self {
        self.target = Some(Target {
            loc_uri: loc_uri.into(),
        });
        self
    }

    /// Sets the credential token.
    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(Credential { data: token.into() });
        self
    }
}

/// The `Source` of a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Device identity URI.
    pub loc_uri: String,
    /// User identity.
    #[serde(default)]
    pub loc_name: String,
}

impl Source {
    /// Creates a source.
    pub fn new(loc_uri: impl Into<String>, loc_name: impl Into<String>) -> Self {
        Self {
            loc_uri: loc_uri.into(),
            loc_name: loc_name.into(),
        }
    }
}

/// The `Target` of a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Server endpoint URI.
    pub loc_uri: String,
}

/// The `Cred` of a header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque token issued during discovery/enrollment.
    pub data: String,
}

/// The `SyncBody` of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncmlBody {
    /// Client-initiated alert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
    /// `Replace` command items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<Vec<Item>>,
    /// `Results` items answering earlier `Get` commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Item>>,
    /// Statuses for commands sent in the previous reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<Status>,
}

impl SyncmlBody {
    /// Sets the alert.
    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alert = Some(alert);
        self
    }

    /// Sets the `Replace` items.
    pub fn with_replace(mut self, items: Vec<Item>) -> Self {
        self.replace = Some(items);
        self
    }

    /// Sets the `Results` items.
    pub fn with_results(mut self, items: Vec<Item>) -> Self {
        self.results = Some(items);
        self
    }

    /// Appends a status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.statuses.push(status);
        self
    }
}

/// An `Alert` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Command id assigned by the client.
    #[serde(default)]
    pub cmd_id: u32,
    /// Alert code (e.g. 1201 client-initiated session, 1226 generic alert).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    /// Alert payload.
    #[serde(default)]
    pub data: String,
}

impl Alert {
    /// Creates an alert carrying `data`.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            cmd_id: 1,
            code: None,
            data: data.into(),
        }
    }

    /// Sets the alert code.
    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }
}

/// An `Item` inside a `Replace` or `Results` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Source node URI, when the client sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Item data.
    #[serde(default)]
    pub data: String,
}

impl Item {
    /// Creates an item carrying only data.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            source: None,
            data: data.into(),
        }
    }

    /// Creates an item for a node URI.
    pub fn with_source(source: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            data: data.into(),
        }
    }
}

/// A `Status` sent by the client for a command of the previous reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Command id of the client's status element.
    #[serde(default)]
    pub cmd_id: u32,
    /// Command id of the referenced server command.
    pub cmd_ref: u32,
    /// Referenced command name (`Get`, `Exec`, ...).
    pub cmd: String,
    /// Result code.
    pub data: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> SyncmlMessage {
        SyncmlMessage::new(
            SyncmlHeader::new(1, 1, Source::new("urn:uuid:dev-1", "alice"))
                .with_credential("token-1"),
        )
        .with_body(SyncmlBody::default().with_alert(Alert::new("1201").with_code(1201)))
    }

    #[test]
    fn accessors() {
        let msg = message();
        assert_eq!(msg.device_uri(), "urn:uuid:dev-1");
        assert_eq!(msg.user(), "alice");
        assert_eq!(msg.alert_data(), Some("1201"));
        assert_eq!(msg.require_device_uri(), Ok("urn:uuid:dev-1"));
    }

    #[test]
    fn empty_device_uri_is_missing() {
        let msg = SyncmlMessage::new(SyncmlHeader::new(2, 1, Source::new("", "alice")));
        assert_eq!(
            msg.require_device_uri(),
            Err(ProtocolError::MissingHeaderField {
                field: "Source/LocURI"
            })
        );
    }

    #[test]
    fn json_defaults_for_optional_sections() {
        let json = r#"{
            "header": {
                "session_id": 5,
                "msg_id": 1,
                "source": { "loc_uri": "urn:uuid:dev-1" }
            }
        }"#;

        let msg: SyncmlMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.header.session_id, 5);
        assert_eq!(msg.user(), "");
        assert!(msg.header.credential.is_none());
        assert!(msg.body.alert.is_none());
        assert!(msg.body.replace.is_none());
        assert!(msg.body.statuses.is_empty());
    }

    #[test]
    fn json_keeps_item_order() {
        let msg = message().with_body(
            SyncmlBody::default().with_results(vec![Item::new("a"), Item::new("b")]),
        );
        let json = serde_json::to_string(&msg).unwrap();
        let back: SyncmlMessage = serde_json::from_str(&json).unwrap();

        let data: Vec<_> = back
            .body
            .results
            .unwrap()
            .into_iter()
            .map(|i| i.data)
            .collect();
        assert_eq!(data, vec!["a", "b"]);
    }
}
