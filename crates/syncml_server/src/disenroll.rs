//! Client-initiated disenrollment.

use crate::collaborators::DeviceRegistry;
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use syncml_protocol::SyncmlMessage;
use tracing::info;

/// Removes devices that asked to leave management.
pub struct DisenrollmentHandler {
    registry: Arc<dyn DeviceRegistry>,
}

impl DisenrollmentHandler {
    /// Creates a handler.
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self { registry }
    }

    /// Removes the sender's device record.
    pub fn disenroll(&self, message: &SyncmlMessage) -> ServerResult<()> {
        let identifier = message.require_device_uri()?;

        if self
            .registry
            .get(identifier)
            .map_err(ServerError::RegistryUnavailable)?
            .is_none()
        {
            return Err(ServerError::DeviceNotFound(identifier.to_string()));
        }

        if !self
            .registry
            .disenroll(identifier)
            .map_err(ServerError::RegistryUnavailable)?
        {
            return Err(ServerError::DisenrollmentFailure(format!(
                "registry refused to remove device {identifier}"
            )));
        }

        info!(device_id = %identifier, "device disenrolled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceRecord, EnrolmentInfo};
    use crate::memory::InMemoryDeviceRegistry;
    use syncml_protocol::constants::DISENROLL_ALERT_DATA;
    use syncml_protocol::{Alert, Source, SyncmlBody, SyncmlHeader};

    fn message(device: &str) -> SyncmlMessage {
        SyncmlMessage::new(SyncmlHeader::new(5, 1, Source::new(device, "alice")))
            .with_body(SyncmlBody::default().with_alert(Alert::new(DISENROLL_ALERT_DATA)))
    }

    #[test]
    fn removes_enrolled_device() {
        let registry = Arc::new(InMemoryDeviceRegistry::new());
        registry
            .enroll(DeviceRecord::new("dev-1", "windows", EnrolmentInfo::byod("alice")))
            .unwrap();

        DisenrollmentHandler::new(registry.clone())
            .disenroll(&message("dev-1"))
            .unwrap();
        assert!(registry.get("dev-1").unwrap().is_none());
    }

    #[test]
    fn unknown_device_is_not_found() {
        let registry = Arc::new(InMemoryDeviceRegistry::new());

        let err = DisenrollmentHandler::new(registry)
            .disenroll(&message("dev-404"))
            .unwrap_err();
        assert!(matches!(err, ServerError::DeviceNotFound(ref id) if id == "dev-404"));
    }

    #[test]
    fn empty_device_uri_is_malformed() {
        let registry = Arc::new(InMemoryDeviceRegistry::new());

        let err = DisenrollmentHandler::new(registry)
            .disenroll(&message(""))
            .unwrap_err();
        assert!(matches!(err, ServerError::MalformedPayload(_)));
    }
}
