//! Reply documents sent back to the device.

use crate::constants::status_codes;
use crate::message::SyncmlMessage;
use std::fmt;

/// A structured SyncML reply, ready to be serialized by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncmlReply {
    /// The reply `SyncHdr`.
    pub header: ReplyHeader,
    /// The reply `SyncBody`.
    pub body: ReplyBody,
}

impl SyncmlReply {
    /// Creates an empty reply answering `request`.
    ///
    /// The header echoes the request's session and message ids and swaps
    /// source and target. The first status acknowledges the request header.
    pub fn answering(request: &SyncmlMessage) -> Self {
        let header = ReplyHeader {
            session_id: request.header.session_id,
            msg_id: request.header.msg_id,
            target_uri: request.header.source.loc_uri.clone(),
            source_uri: request
                .header
                .target
                .as_ref()
                .map(|t| t.loc_uri.clone())
                .unwrap_or_default(),
        };

        let mut reply = Self {
            header,
            body: ReplyBody::default(),
        };

        let header_status = if request.header.credential.is_some() {
            status_codes::AUTHENTICATION_ACCEPTED
        } else {
            status_codes::OK
        };
        reply.push_status(request.header.msg_id, 0, "SyncHdr", header_status);
        reply
    }

    /// Appends a status for a received command and returns its command id.
    pub fn push_status(
        &mut self,
        msg_ref: u32,
        cmd_ref: u32,
        cmd: impl Into<String>,
        data: u16,
    ) -> u32 {
        let cmd_id = self.body.next_cmd_id();
        self.body.statuses.push(ReplyStatus {
            cmd_id,
            msg_ref,
            cmd_ref,
            cmd: cmd.into(),
            data,
        });
        cmd_id
    }

    /// Appends a command and returns its command id.
    pub fn push_command(&mut self, name: CommandName, items: Vec<ReplyItem>) -> u32 {
        let cmd_id = self.body.next_cmd_id();
        self.body.commands.push(ReplyCommand {
            cmd_id,
            name,
            items,
        });
        cmd_id
    }

    /// Records a compliance note.
    pub fn push_note(&mut self, note: ComplianceNote) {
        self.body.notes.push(note);
    }

    /// Returns true if the reply carries no commands.
    pub fn is_acknowledgement(&self) -> bool {
        self.body.commands.is_empty()
    }
}

/// The reply `SyncHdr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHeader {
    /// Session id echoed from the request.
    pub session_id: u32,
    /// Message id echoed from the request.
    pub msg_id: u32,
    /// Device identity URI (the request's source).
    pub target_uri: String,
    /// Server endpoint URI (the request's target).
    pub source_uri: String,
}

/// The reply `SyncBody`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBody {
    /// Statuses, in command id order.
    pub statuses: Vec<ReplyStatus>,
    /// Commands, in command id order, after all statuses.
    pub commands: Vec<ReplyCommand>,
    /// Policy features that were not sent.
    pub notes: Vec<ComplianceNote>,
    /// Whether this is the final message of the package.
    pub is_final: bool,
}

impl ReplyBody {
    fn next_cmd_id(&self) -> u32 {
        (self.statuses.len() + self.commands.len()) as u32 + 1
    }
}

impl Default for ReplyBody {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            commands: Vec::new(),
            notes: Vec::new(),
            is_final: true,
        }
    }
}

/// A `Status` element of the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyStatus {
    /// Command id of this status.
    pub cmd_id: u32,
    /// Message id of the referenced request.
    pub msg_ref: u32,
    /// Command id of the referenced request command (0 for the header).
    pub cmd_ref: u32,
    /// Referenced command name.
    pub cmd: String,
    /// Status code.
    pub data: u16,
}

/// SyncML command elements the server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    /// Read nodes.
    Get,
    /// Execute nodes.
    Exec,
    /// Write nodes.
    Replace,
    /// Create nodes.
    Add,
}

impl CommandName {
    /// Returns the XML element name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Get => "Get",
            CommandName::Exec => "Exec",
            CommandName::Replace => "Replace",
            CommandName::Add => "Add",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command of the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyCommand {
    /// Command id.
    pub cmd_id: u32,
    /// Command element.
    pub name: CommandName,
    /// Items addressed by the command.
    pub items: Vec<ReplyItem>,
}

/// An `Item` of a reply command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyItem {
    /// Target node URI.
    pub target: String,
    /// Item metadata.
    pub meta: Option<ItemMeta>,
    /// Item data.
    pub data: Option<String>,
}

impl ReplyItem {
    /// Creates an item addressing `target` with no data.
    pub fn target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            meta: None,
            data: None,
        }
    }

    /// Sets the data.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the metadata.
    pub fn with_meta(mut self, meta: ItemMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// `Meta` of a reply item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemMeta {
    /// Data format (`chr`, `int`, `bool`, `xml`).
    pub format: Option<String>,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Hex SHA-256 of the item data, carried as extended meta information.
    pub checksum: Option<String>,
}

/// A policy feature left out of the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceNote {
    /// Operation the feature belongs to.
    pub operation_id: u64,
    /// Feature code.
    pub feature_code: String,
    /// Why the feature was not sent.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{SyncmlHeader, Source};

    fn request() -> SyncmlMessage {
        SyncmlMessage::new(
            SyncmlHeader::new(4, 3, Source::new("urn:uuid:dev-1", "alice"))
                .with_target("https://mdm.example.com/syncml"),
        )
    }

    #[test]
    fn header_echoes_request() {
        let reply = SyncmlReply::answering(&request());
        assert_eq!(reply.header.session_id, 4);
        assert_eq!(reply.header.msg_id, 3);
        assert_eq!(reply.header.target_uri, "urn:uuid:dev-1");
        assert_eq!(reply.header.source_uri, "https://mdm.example.com/syncml");
        assert!(reply.body.is_final);
    }

    #[test]
    fn header_status_comes_first() {
        let reply = SyncmlReply::answering(&request());
        assert_eq!(reply.body.statuses.len(), 1);
        let status = &reply.body.statuses[0];
        assert_eq!(status.cmd_id, 1);
        assert_eq!(status.cmd, "SyncHdr");
        assert_eq!(status.data, status_codes::OK);
        assert!(reply.is_acknowledgement());
    }

    #[test]
    fn credential_is_acknowledged() {
        let mut req = request();
        req.header.credential = Some(crate::message::Credential {
            data: "token".into(),
        });
        let reply = SyncmlReply::answering(&req);
        assert_eq!(
            reply.body.statuses[0].data,
            status_codes::AUTHENTICATION_ACCEPTED
        );
    }

    #[test]
    fn command_ids_are_sequential() {
        let mut reply = SyncmlReply::answering(&request());
        let status_id = reply.push_status(3, 2, "Alert", status_codes::OK);
        let get_id = reply.push_command(CommandName::Get, vec![ReplyItem::target("./DevInfo/Man")]);
        let exec_id = reply.push_command(CommandName::Exec, vec![]);

        assert_eq!((status_id, get_id, exec_id), (2, 3, 4));
        assert!(!reply.is_acknowledgement());
    }
}
