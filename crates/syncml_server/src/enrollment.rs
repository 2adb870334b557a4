//! Two-step device enrollment.
//!
//! The first enrollment message creates the device from the facts the client
//! volunteers; the reply asks for the remaining facts, which arrive with the
//! second message and replace the device's property set.

use crate::collaborators::{DeviceRegistry, ServiceError};
use crate::config::{DriverConfig, EmptyPropertiesPolicy};
use crate::device::{DeviceRecord, EnrolmentInfo};
use crate::error::{ServerError, ServerResult};
use std::sync::Arc;
use syncml_protocol::constants::property_names;
use syncml_protocol::{CompletionFacts, EnrollmentFacts, SyncmlMessage};
use tracing::{debug, info};

/// Creates and enriches device records during the enrollment session.
pub struct EnrollmentCoordinator {
    registry: Arc<dyn DeviceRegistry>,
    config: DriverConfig,
}

impl EnrollmentCoordinator {
    /// Creates a coordinator.
    pub fn new(registry: Arc<dyn DeviceRegistry>, config: DriverConfig) -> Self {
        Self { registry, config }
    }

    /// Handles the first enrollment message: creates the device.
    ///
    /// The owner is the header's user identity. The registry refusing the
    /// record, including a concurrent enrollment of the same identifier, is
    /// an [`ServerError::EnrollmentFailure`].
    pub fn enroll(&self, message: &SyncmlMessage) -> ServerResult<DeviceRecord> {
        let facts = EnrollmentFacts::extract(message)?;
        debug!(
            device_id = %facts.device_id,
            manufacturer = %facts.manufacturer,
            model = %facts.model,
            os_version = %facts.mod_version,
            language = %facts.language,
            "enrollment facts"
        );

        let record = self.initial_record(&facts, message.user());

        match self.registry.enroll(record.clone()) {
            Ok(true) => {
                info!(device_id = %record.identifier, owner = %record.enrolment.owner, "device enrolled");
                Ok(record)
            }
            Ok(false) => Err(ServerError::EnrollmentFailure(format!(
                "registry refused device {}",
                record.identifier
            ))),
            Err(ServiceError::Conflict(reason)) | Err(ServiceError::Rejected(reason)) => {
                Err(ServerError::EnrollmentFailure(reason))
            }
            Err(e) => Err(ServerError::RegistryUnavailable(e)),
        }
    }

    /// Handles the second enrollment message: replaces the device's
    /// properties with the reported facts.
    pub fn complete(&self, message: &SyncmlMessage) -> ServerResult<DeviceRecord> {
        let facts = CompletionFacts::extract(message)?;
        let identifier = message.require_device_uri()?;

        let mut record = self
            .registry
            .get(identifier)
            .map_err(ServerError::RegistryUnavailable)?
            .ok_or_else(|| ServerError::DeviceNotFound(identifier.to_string()))?;

        if record.properties.is_empty() {
            match self.config.empty_properties_policy {
                EmptyPropertiesPolicy::Complete => {}
                EmptyPropertiesPolicy::Reject => {
                    return Err(ServerError::ModificationFailure(format!(
                        "device {identifier} has no enrollment properties"
                    )))
                }
                EmptyPropertiesPolicy::RequestResend => {
                    return Err(ServerError::CompletionPending(format!(
                        "device {identifier} is not ready for completion"
                    )))
                }
            }
        }

        record.replace_properties([
            (property_names::IMEI, facts.imei),
            (property_names::OS_VERSION, facts.os_version),
            (property_names::IMSI, facts.imsi),
            (property_names::VENDOR, facts.vendor),
            (property_names::MAC_ADDRESS, facts.mac_address),
            (property_names::RESOLUTION, facts.resolution),
            (property_names::DEVICE_NAME, facts.device_name),
        ]);
        record.identifier = identifier.to_string();
        record.device_type = self.config.device_type.clone();

        match self.registry.modify(record.clone()) {
            Ok(true) => {
                info!(device_id = %record.identifier, "enrollment completed");
                Ok(record)
            }
            Ok(false) => Err(ServerError::ModificationFailure(format!(
                "registry refused update of device {identifier}"
            ))),
            Err(ServiceError::Conflict(reason)) | Err(ServiceError::Rejected(reason)) => {
                Err(ServerError::ModificationFailure(reason))
            }
            Err(e) => Err(ServerError::RegistryUnavailable(e)),
        }
    }

    fn initial_record(&self, facts: &EnrollmentFacts, owner: &str) -> DeviceRecord {
        DeviceRecord::new(
            facts.device_id.clone(),
            self.config.device_type.clone(),
            EnrolmentInfo::byod(owner),
        )
        .with_property(property_names::OS_VERSION, facts.mod_version.clone())
        .with_property(property_names::VENDOR, facts.manufacturer.clone())
        .with_property(property_names::MODEL, facts.model.clone())
        .with_property(property_names::LANGUAGE, facts.language.clone())
    }
}
