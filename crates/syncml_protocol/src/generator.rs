//! SyncML reply generation.
//!
//! [`XmlReplyGenerator`] writes a [`SyncmlReply`] as a compact SyncML 1.2
//! document. Output is deterministic: the same reply always produces the
//! same bytes.

use crate::constants::{SYNCML_PROTOCOL, SYNCML_VERSION};
use crate::error::{ProtocolError, ProtocolResult};
use crate::reply::{ItemMeta, ReplyCommand, ReplyItem, ReplyStatus, SyncmlReply};

const SYNCML_NAMESPACE: &str = "SYNCML:SYNCML1.2";
const METINF_NAMESPACE: &str = "syncml:metinf";

/// Serializes reply documents.
pub trait ReplyGenerator: Send + Sync {
    /// Serializes `reply` into its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EncodingFailed`] if the reply contains data
    /// that cannot be represented.
    fn generate(&self, reply: &SyncmlReply) -> ProtocolResult<String>;
}

/// Generator producing SyncML XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReplyGenerator;

impl XmlReplyGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }
}

impl ReplyGenerator for XmlReplyGenerator {
    fn generate(&self, reply: &SyncmlReply) -> ProtocolResult<String> {
        let mut writer = XmlWriter::with_capacity(512);
        writer.write_reply(reply)?;
        Ok(writer.into_string())
    }
}

/// A minimal XML writer for SyncML documents.
struct XmlWriter {
    buffer: String,
}

impl XmlWriter {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    fn into_string(self) -> String {
        self.buffer
    }

    fn write_reply(&mut self, reply: &SyncmlReply) -> ProtocolResult<()> {
        self.open_ns("SyncML", SYNCML_NAMESPACE);

        self.open("SyncHdr");
        self.leaf("VerDTD", SYNCML_VERSION)?;
        self.leaf("VerProto", SYNCML_PROTOCOL)?;
        self.leaf("SessionID", &reply.header.session_id.to_string())?;
        self.leaf("MsgID", &reply.header.msg_id.to_string())?;
        self.location("Target", &reply.header.target_uri)?;
        self.location("Source", &reply.header.source_uri)?;
        self.close("SyncHdr");

        self.open("SyncBody");
        for status in &reply.body.statuses {
            self.write_status(status)?;
        }
        for command in &reply.body.commands {
            self.write_command(command)?;
        }
        for note in &reply.body.notes {
            self.comment(&format!(
                "operation {} feature {} not sent: {}",
                note.operation_id, note.feature_code, note.reason
            ))?;
        }
        if reply.body.is_final {
            self.empty("Final");
        }
        self.close("SyncBody");

        self.close("SyncML");
        Ok(())
    }

    fn write_status(&mut self, status: &ReplyStatus) -> ProtocolResult<()> {
        self.open("Status");
        self.leaf("CmdID", &status.cmd_id.to_string())?;
        self.leaf("MsgRef", &status.msg_ref.to_string())?;
        self.leaf("CmdRef", &status.cmd_ref.to_string())?;
        self.leaf("Cmd", &status.cmd)?;
        self.leaf("Data", &status.data.to_string())?;
        self.close("Status");
        Ok(())
    }

    fn write_command(&mut self, command: &ReplyCommand) -> ProtocolResult<()> {
        let name = command.name.as_str();
        self.open(name);
        self.leaf("CmdID", &command.cmd_id.to_string())?;
        for item in &command.items {
            self.write_item(item)?;
        }
        self.close(name);
        Ok(())
    }

    fn write_item(&mut self, item: &ReplyItem) -> ProtocolResult<()> {
        self.open("Item");
        self.location("Target", &item.target)?;
        if let Some(ref meta) = item.meta {
            self.write_meta(meta)?;
        }
        if let Some(ref data) = item.data {
            self.leaf("Data", data)?;
        }
        self.close("Item");
        Ok(())
    }

    fn write_meta(&mut self, meta: &ItemMeta) -> ProtocolResult<()> {
        self.open("Meta");
        if let Some(ref format) = meta.format {
            self.leaf_ns("Format", METINF_NAMESPACE, format)?;
        }
        if let Some(ref mime_type) = meta.mime_type {
            self.leaf_ns("Type", METINF_NAMESPACE, mime_type)?;
        }
        if let Some(ref checksum) = meta.checksum {
            self.leaf_ns("EMI", METINF_NAMESPACE, checksum)?;
        }
        self.close("Meta");
        Ok(())
    }

    fn location(&mut self, element: &str, uri: &str) -> ProtocolResult<()> {
        self.open(element);
        self.leaf("LocURI", uri)?;
        self.close(element);
        Ok(())
    }

    fn open(&mut self, name: &str) {
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push('>');
    }

    fn open_ns(&mut self, name: &str, namespace: &str) {
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push_str(" xmlns=\"");
        self.buffer.push_str(namespace);
        self.buffer.push_str("\">");
    }

    fn close(&mut self, name: &str) {
        self.buffer.push_str("</");
        self.buffer.push_str(name);
        self.buffer.push('>');
    }

    fn empty(&mut self, name: &str) {
        self.buffer.push('<');
        self.buffer.push_str(name);
        self.buffer.push_str("/>");
    }

    fn leaf(&mut self, name: &str, text: &str) -> ProtocolResult<()> {
        self.open(name);
        self.text(text)?;
        self.close(name);
        Ok(())
    }

    fn leaf_ns(&mut self, name: &str, namespace: &str, text: &str) -> ProtocolResult<()> {
        self.open_ns(name, namespace);
        self.text(text)?;
        self.close(name);
        Ok(())
    }

    fn comment(&mut self, text: &str) -> ProtocolResult<()> {
        if text.contains("--") || text.ends_with('-') {
            return Err(ProtocolError::encoding_failed(
                "comment text may not contain \"--\"",
            ));
        }
        check_chars(text)?;
        self.buffer.push_str("<!-- ");
        self.buffer.push_str(text);
        self.buffer.push_str(" -->");
        Ok(())
    }

    fn text(&mut self, text: &str) -> ProtocolResult<()> {
        check_chars(text)?;
        for c in text.chars() {
            match c {
                '<' => self.buffer.push_str("&lt;"),
                '>' => self.buffer.push_str("&gt;"),
                '&' => self.buffer.push_str("&amp;"),
                '"' => self.buffer.push_str("&quot;"),
                '\'' => self.buffer.push_str("&apos;"),
                _ => self.buffer.push(c),
            }
        }
        Ok(())
    }
}

/// Rejects characters XML 1.0 cannot carry, even escaped.
fn check_chars(text: &str) -> ProtocolResult<()> {
    match text
        .chars()
        .find(|c| c.is_control() && !matches!(c, '\t' | '\n' | '\r'))
    {
        Some(c) => Err(ProtocolError::encoding_failed(format!(
            "character U+{:04X} is not allowed in XML",
            c as u32
        ))),
        None => Ok(()),
    }
}
