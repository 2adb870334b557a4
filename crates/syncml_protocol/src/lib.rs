//! # SyncML Protocol
//!
//! Message model and pure protocol logic for SyncML device management.
//!
//! This crate provides:
//! - `SyncmlMessage`, the parsed form of a client request
//! - `Phase` classification from message id, session id and alert
//! - Fixed-position device fact extraction
//! - Management operations and the device-info operation set
//! - `SyncmlReply` documents and an XML reply generator
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
mod error;
mod facts;
mod generator;
mod message;
mod operation;
mod parser;
mod phase;
mod reply;

pub use error::{ProtocolError, ProtocolResult};
pub use facts::{CompletionFacts, EnrollmentFacts, ItemList};
pub use generator::{ReplyGenerator, XmlReplyGenerator};
pub use message::{
    Alert, Credential, Item, Source, Status, SyncmlBody, SyncmlHeader, SyncmlMessage, Target,
};
pub use operation::{device_info_operations, Operation, OperationKind, OperationStatus};
pub use parser::{JsonMessageParser, MessageParser};
pub use phase::Phase;
pub use reply::{
    CommandName, ComplianceNote, ItemMeta, ReplyBody, ReplyCommand, ReplyHeader, ReplyItem,
    ReplyStatus, SyncmlReply,
};
