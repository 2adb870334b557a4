//! Test fixtures and server helpers.
//!
//! Provides canned SyncML requests for every phase, a server wired to
//! in-memory collaborators, and a collaborator that always fails.

use std::sync::Arc;
use syncml_protocol::constants::{property_names, DISENROLL_ALERT_DATA};
use syncml_protocol::{
    device_info_operations, Alert, Item, Operation, Source, Status, SyncmlBody, SyncmlHeader,
    SyncmlMessage,
};
use syncml_server::{
    CachedCredential, CredentialCache, DeviceRegistry, DeviceRecord, DriverConfig, DriverContext,
    EnrolmentInfo, InMemoryServices, NotificationService, OperationSource, Policy,
    PolicyEvaluator, ServiceError, ServiceResult, SyncmlResponse, SyncmlServer,
};

/// Device identity used by the fixtures.
pub const DEVICE_ID: &str = "urn:uuid:5d9b8c11-7a3e-4f0b-9c2d-1e8f6a4b3c21";

/// User identity used by the fixtures.
pub const USER: &str = "alice@example.com";

/// Credential token used by the fixtures.
pub const TOKEN: &str = "7f3c1e9a-enrollment-token";

/// Server endpoint URI used by the fixtures.
pub const SERVER_URI: &str = "https://mdm.example.com/devicemgt";

fn items(values: &[&str]) -> Vec<Item> {
    values.iter().map(|v| Item::new(*v)).collect()
}

/// First enrollment message (session 1, message 1).
pub fn phase_one_message(device_id: &str, user: &str, token: &str) -> SyncmlMessage {
    let header = SyncmlHeader::new(1, 1, Source::new(device_id, user))
        .with_target(SERVER_URI)
        .with_credential(token);

    SyncmlMessage::new(header).with_body(
        SyncmlBody::default()
            .with_alert(Alert::new("1201").with_code(1201))
            .with_replace(items(&[device_id, "Contoso", "Lumia 950", "10.0.10586", "en-US"])),
    )
}

/// Second enrollment message (session 1, message 2).
pub fn phase_two_message(device_id: &str, user: &str) -> SyncmlMessage {
    let header = SyncmlHeader::new(1, 2, Source::new(device_id, user)).with_target(SERVER_URI);

    let results = device_info_operations()
        .into_iter()
        .zip([
            "10.0.10586.0",
            "310150123456789",
            "490154203237518",
            "Contoso",
            "00:1A:2B:3C:4D:5E",
            "1440x2560",
            "Alice's phone",
        ])
        .map(|(op, data)| Item::with_source(op.code, data))
        .collect();

    SyncmlMessage::new(header).with_body(SyncmlBody::default().with_results(results))
}

/// Disenrollment request in session `session_id`.
pub fn disenroll_message(device_id: &str, user: &str, session_id: u32) -> SyncmlMessage {
    let header =
        SyncmlHeader::new(session_id, 1, Source::new(device_id, user)).with_target(SERVER_URI);

    SyncmlMessage::new(header)
        .with_body(SyncmlBody::default().with_alert(Alert::new(DISENROLL_ALERT_DATA).with_code(1226)))
}

/// Steady-state request in session `session_id` carrying `statuses`.
pub fn exchange_message(
    device_id: &str,
    user: &str,
    session_id: u32,
    statuses: Vec<Status>,
) -> SyncmlMessage {
    let header =
        SyncmlHeader::new(session_id, 1, Source::new(device_id, user)).with_target(SERVER_URI);

    let mut body = SyncmlBody::default().with_alert(Alert::new("1200").with_code(1200));
    for status in statuses {
        body = body.with_status(status);
    }
    SyncmlMessage::new(header).with_body(body)
}

/// A device status for a command of the previous reply.
pub fn command_status(cmd_ref: u32, cmd: &str, code: u16) -> Status {
    Status {
        cmd_id: cmd_ref,
        cmd_ref,
        cmd: cmd.to_string(),
        data: code,
    }
}

/// A server over in-memory collaborators, with handles to all of them.
pub struct TestBackend {
    /// The server under test.
    pub server: SyncmlServer,
    /// Collaborator handles.
    pub services: InMemoryServices,
}

impl TestBackend {
    /// Creates a backend with the default configuration and the fixture
    /// credential cached.
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    /// Creates a backend with `config` and the fixture credential cached.
    pub fn with_config(config: DriverConfig) -> Self {
        Self::customized(config, |_| {})
    }

    /// Creates a backend whose context is adjusted by `customize`, e.g. to
    /// swap in a failing collaborator.
    pub fn customized(config: DriverConfig, customize: impl FnOnce(&mut DriverContext)) -> Self {
        let services = InMemoryServices::new(&config);
        services.credentials.insert(TOKEN, USER);

        let mut context = services.context(config);
        customize(&mut context);

        Self {
            server: SyncmlServer::new(context),
            services,
        }
    }

    /// Runs both enrollment messages for `device_id` and returns the second
    /// response.
    pub fn enroll(&self, device_id: &str) -> SyncmlResponse {
        let first = self.server.submit(&phase_one_message(device_id, USER, TOKEN));
        assert!(first.is_ok(), "initial enrollment failed: {}", first.body);
        self.server.submit(&phase_two_message(device_id, USER))
    }

    /// Returns the registry record of a device.
    pub fn device(&self, device_id: &str) -> Option<DeviceRecord> {
        self.services
            .registry
            .get(device_id)
            .expect("in-memory registry never fails")
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestBackend {
    type Target = SyncmlServer;

    fn deref(&self) -> &Self::Target {
        &self.server
    }
}

/// A collaborator that fails every call with [`ServiceError::Unavailable`].
#[derive(Debug, Clone)]
pub struct Unavailable {
    reason: String,
}

impl Unavailable {
    /// Creates a failing collaborator.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Creates a shared failing collaborator.
    pub fn shared(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(reason))
    }

    fn fail<T>(&self) -> ServiceResult<T> {
        Err(ServiceError::Unavailable(self.reason.clone()))
    }
}

impl CredentialCache for Unavailable {
    fn lookup(&self, _token: &str) -> ServiceResult<Option<CachedCredential>> {
        self.fail()
    }
}

impl DeviceRegistry for Unavailable {
    fn enroll(&self, _record: DeviceRecord) -> ServiceResult<bool> {
        self.fail()
    }

    fn get(&self, _identifier: &str) -> ServiceResult<Option<DeviceRecord>> {
        self.fail()
    }

    fn modify(&self, _record: DeviceRecord) -> ServiceResult<bool> {
        self.fail()
    }

    fn disenroll(&self, _identifier: &str) -> ServiceResult<bool> {
        self.fail()
    }
}

impl OperationSource for Unavailable {
    fn update_statuses(&self, _device_id: &str, _statuses: &[Status]) -> ServiceResult<()> {
        self.fail()
    }

    fn pending_operations(&self, _message: &SyncmlMessage) -> ServiceResult<Vec<Operation>> {
        self.fail()
    }

    fn mark_in_progress(&self, _device_id: &str, _operations: &[Operation]) -> ServiceResult<()> {
        self.fail()
    }
}

impl NotificationService for Unavailable {
    fn mark_delivered(&self, _device_id: &str, _operations: &[Operation]) -> ServiceResult<()> {
        self.fail()
    }
}

impl PolicyEvaluator for Unavailable {
    fn effective_policy(&self, _device_id: &str) -> ServiceResult<Option<Policy>> {
        self.fail()
    }

    fn is_feature_supported(&self, _device_type: &str, _feature_code: &str) -> ServiceResult<bool> {
        self.fail()
    }
}

/// A registry that reports every device as enrolled but answers every
/// change with a fixed outcome.
#[derive(Debug, Clone)]
pub struct RefusingRegistry {
    outcome: ServiceResult<bool>,
}

impl RefusingRegistry {
    /// A registry that declines changes (`Ok(false)`).
    pub fn declining() -> Arc<Self> {
        Arc::new(Self { outcome: Ok(false) })
    }

    /// A registry that reports a conflict for every change.
    pub fn conflicting(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(ServiceError::Conflict(reason.into())),
        })
    }
}

impl DeviceRegistry for RefusingRegistry {
    fn enroll(&self, _record: DeviceRecord) -> ServiceResult<bool> {
        self.outcome.clone()
    }

    fn get(&self, identifier: &str) -> ServiceResult<Option<DeviceRecord>> {
        Ok(Some(
            DeviceRecord::new(identifier, "windows", EnrolmentInfo::byod(USER))
                .with_property(property_names::VENDOR, "Contoso"),
        ))
    }

    fn modify(&self, _record: DeviceRecord) -> ServiceResult<bool> {
        self.outcome.clone()
    }

    fn disenroll(&self, _identifier: &str) -> ServiceResult<bool> {
        self.outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncml_protocol::Phase;

    #[test]
    fn fixtures_classify() {
        assert_eq!(
            Phase::of(&phase_one_message(DEVICE_ID, USER, TOKEN)),
            Phase::InitialEnrollment
        );
        assert_eq!(
            Phase::of(&phase_two_message(DEVICE_ID, USER)),
            Phase::EnrollmentCompletion
        );
        assert_eq!(
            Phase::of(&disenroll_message(DEVICE_ID, USER, 2)),
            Phase::Disenrollment
        );
        assert_eq!(
            Phase::of(&exchange_message(DEVICE_ID, USER, 2, vec![])),
            Phase::OperationExchange
        );
    }

    #[test]
    fn backend_enrolls() {
        let backend = TestBackend::new();
        let response = backend.enroll(DEVICE_ID);
        assert!(response.is_ok());
        assert!(backend.device(DEVICE_ID).is_some());
    }

    #[test]
    fn unavailable_always_fails() {
        let failing = Unavailable::new("down");
        assert!(failing.lookup(TOKEN).is_err());
        assert!(failing.get(DEVICE_ID).is_err());
    }

    #[test]
    fn refusing_registry_knows_every_device() {
        let registry = RefusingRegistry::declining();
        assert!(registry.get(DEVICE_ID).unwrap().is_some());
        let record = DeviceRecord::new(DEVICE_ID, "windows", EnrolmentInfo::byod(USER));
        assert_eq!(registry.modify(record), Ok(false));
    }
}
