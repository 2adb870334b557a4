//! Management operations delivered to devices.

use crate::constants::device_info_uris;
use crate::reply::CommandName;
use serde::{Deserialize, Serialize};

/// Kind of management operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Read a node (`Get`).
    Info,
    /// Execute a node (`Exec`), e.g. lock or wipe.
    Command,
    /// Write a single configuration node (`Replace`).
    Config,
    /// Apply the device's effective policy.
    Policy,
    /// Install a profile (`Add`).
    Profile,
}

impl OperationKind {
    /// Returns the SyncML command element used to deliver this kind.
    ///
    /// Policy operations are expanded into one `Replace` per feature.
    pub fn command_name(&self) -> CommandName {
        match self {
            OperationKind::Info => CommandName::Get,
            OperationKind::Command => CommandName::Exec,
            OperationKind::Config | OperationKind::Policy => CommandName::Replace,
            OperationKind::Profile => CommandName::Add,
        }
    }
}

/// Delivery state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Queued, not yet delivered.
    #[default]
    Pending,
    /// Delivered, waiting for the device's status.
    InProgress,
    /// Device reported success.
    Completed,
    /// Device reported failure.
    Error,
}

/// A management operation queued for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation id assigned by the operation source.
    #[serde(default)]
    pub id: u64,
    /// OMA-DM node URI or feature code.
    pub code: String,
    /// Kind of operation.
    pub kind: OperationKind,
    /// JSON payload, when the operation carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// Delivery state.
    #[serde(default)]
    pub status: OperationStatus,
}

impl Operation {
    /// Creates a pending operation without payload.
    pub fn new(kind: OperationKind, code: impl Into<String>) -> Self {
        Self {
            id: 0,
            code: code.into(),
            kind,
            payload: None,
            status: OperationStatus::Pending,
        }
    }

    /// Creates an `Info` operation reading `uri`.
    pub fn info(uri: impl Into<String>) -> Self {
        Self::new(OperationKind::Info, uri)
    }

    /// Sets the operation id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Sets the JSON payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Returns the operations sent in reply to the first enrollment message.
///
/// The device answers them in the second message; the order here is the
/// order of the `Results` items the completion phase reads.
pub fn device_info_operations() -> Vec<Operation> {
    [
        device_info_uris::OS_VERSION,
        device_info_uris::IMSI,
        device_info_uris::IMEI,
        device_info_uris::VENDOR,
        device_info_uris::MAC_ADDRESS,
        device_info_uris::RESOLUTION,
        device_info_uris::DEVICE_NAME,
    ]
    .into_iter()
    .zip(1u64..)
    .map(|(uri, id)| Operation::info(uri).with_id(id))
    .collect()
}
