//! Services the session core depends on.
//!
//! Every collaborator is a synchronous `Send + Sync` service. The core adds
//! no locking of its own; implementations are responsible for their own
//! consistency (e.g. at most one successful `enroll` per identifier).

use crate::device::DeviceRecord;
use serde::{Deserialize, Serialize};
use syncml_protocol::{Operation, Status, SyncmlMessage};
use thiserror::Error;

/// Result type for collaborator calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The request conflicts with the service's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The service refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// A cached enrollment credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedCredential {
    /// User the token was issued to.
    pub username: String,
}

/// Short-lived credential tokens issued before enrollment.
pub trait CredentialCache: Send + Sync {
    /// Looks up a token. Expired tokens are a miss.
    fn lookup(&self, token: &str) -> ServiceResult<Option<CachedCredential>>;
}

/// Storage of device records.
pub trait DeviceRegistry: Send + Sync {
    /// Creates a record. Returns `false` if the registry refused it,
    /// including when the identifier is already enrolled.
    fn enroll(&self, record: DeviceRecord) -> ServiceResult<bool>;

    /// Fetches a record by identifier.
    fn get(&self, identifier: &str) -> ServiceResult<Option<DeviceRecord>>;

    /// Replaces an existing record. Never creates one.
    fn modify(&self, record: DeviceRecord) -> ServiceResult<bool>;

    /// Removes a record.
    fn disenroll(&self, identifier: &str) -> ServiceResult<bool>;
}

/// Queue of management operations.
pub trait OperationSource: Send + Sync {
    /// Applies the statuses the device reported for earlier deliveries.
    fn update_statuses(&self, device_id: &str, statuses: &[Status]) -> ServiceResult<()>;

    /// Returns the operations to deliver in reply to `message`, in order.
    ///
    /// Must not change any operation's state; a failed reply leaves them
    /// pending for the client's resend.
    fn pending_operations(&self, message: &SyncmlMessage) -> ServiceResult<Vec<Operation>>;

    /// Records that `operations` went out in a generated reply.
    fn mark_in_progress(&self, device_id: &str, operations: &[Operation]) -> ServiceResult<()>;
}

/// Push-notification bookkeeping for delivered operations.
pub trait NotificationService: Send + Sync {
    /// Marks the wake-up notifications for `operations` as served.
    fn mark_delivered(&self, device_id: &str, operations: &[Operation]) -> ServiceResult<()>;
}

/// A policy feature: one configuration node with its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyFeature {
    /// Feature code (e.g. `CAMERA`).
    pub code: String,
    /// OMA-DM node URI the feature writes.
    pub node_uri: String,
    /// SyncML data format (`int`, `chr`, `bool`).
    #[serde(default = "default_format")]
    pub format: String,
    /// Value written to the node.
    pub value: String,
}

fn default_format() -> String {
    "chr".to_string()
}

/// The effective policy of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy id.
    pub id: u64,
    /// Policy name.
    pub name: String,
    /// Features, in application order.
    pub features: Vec<PolicyFeature>,
}

/// Policy and feature lookups used while building replies.
pub trait PolicyEvaluator: Send + Sync {
    /// Returns the policy currently effective for a device.
    fn effective_policy(&self, device_id: &str) -> ServiceResult<Option<Policy>>;

    /// Returns whether a device type supports a feature.
    fn is_feature_supported(&self, device_type: &str, feature_code: &str) -> ServiceResult<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_format_defaults_to_chr() {
        let feature: PolicyFeature = serde_json::from_str(
            r#"{"code":"CAMERA","node_uri":"./Vendor/MSFT/Policy/Config/Camera/AllowCamera","value":"0"}"#,
        )
        .unwrap();
        assert_eq!(feature.format, "chr");
    }

    #[test]
    fn service_error_display() {
        let err = ServiceError::Unavailable("registry down".into());
        assert_eq!(err.to_string(), "service unavailable: registry down");
    }
}
