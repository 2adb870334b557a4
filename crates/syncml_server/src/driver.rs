//! Per-request session driver.

use crate::collaborators::{
    CredentialCache, DeviceRegistry, NotificationService, OperationSource, PolicyEvaluator,
};
use crate::config::DriverConfig;
use crate::disenroll::DisenrollmentHandler;
use crate::enrollment::EnrollmentCoordinator;
use crate::error::{ServerError, ServerResult};
use crate::reply::OperationReplyBuilder;
use crate::status::{HttpStatus, SessionState, SyncmlResponse};
use std::sync::Arc;
use syncml_protocol::{
    device_info_operations, Phase, ReplyGenerator, SyncmlMessage, XmlReplyGenerator,
};
use tracing::{debug, error, info, warn};

/// Collaborators and configuration shared by all requests.
pub struct DriverContext {
    /// Driver configuration.
    pub config: DriverConfig,
    /// Enrollment credential cache.
    pub credentials: Arc<dyn CredentialCache>,
    /// Device registry.
    pub registry: Arc<dyn DeviceRegistry>,
    /// Operation queue.
    pub operations: Arc<dyn OperationSource>,
    /// Notification bookkeeping.
    pub notifications: Arc<dyn NotificationService>,
    /// Policy evaluation.
    pub policy: Arc<dyn PolicyEvaluator>,
    /// Reply serialization.
    pub generator: Arc<dyn ReplyGenerator>,
}

impl DriverContext {
    /// Creates a context that serializes replies as SyncML XML.
    pub fn new(
        config: DriverConfig,
        credentials: Arc<dyn CredentialCache>,
        registry: Arc<dyn DeviceRegistry>,
        operations: Arc<dyn OperationSource>,
        notifications: Arc<dyn NotificationService>,
        policy: Arc<dyn PolicyEvaluator>,
    ) -> Self {
        Self {
            config,
            credentials,
            registry,
            operations,
            notifications,
            policy,
            generator: Arc::new(XmlReplyGenerator::new()),
        }
    }

    /// Replaces the reply generator.
    pub fn with_generator(mut self, generator: Arc<dyn ReplyGenerator>) -> Self {
        self.generator = generator;
        self
    }
}

/// Turns one request into one response.
///
/// The driver holds no per-device state between requests; everything a
/// request needs is in the message or behind the collaborators.
pub struct SessionDriver {
    context: Arc<DriverContext>,
    enrollment: EnrollmentCoordinator,
    disenrollment: DisenrollmentHandler,
    replies: OperationReplyBuilder,
}

impl SessionDriver {
    /// Creates a driver.
    pub fn new(context: Arc<DriverContext>) -> Self {
        let enrollment =
            EnrollmentCoordinator::new(Arc::clone(&context.registry), context.config.clone());
        let disenrollment = DisenrollmentHandler::new(Arc::clone(&context.registry));
        let replies = OperationReplyBuilder::new(
            Arc::clone(&context.policy),
            Arc::clone(&context.generator),
            context.config.device_type.clone(),
        );

        Self {
            context,
            enrollment,
            disenrollment,
            replies,
        }
    }

    /// Processes a parsed request.
    ///
    /// Exactly one response is produced. Failures are logged here, once,
    /// and mapped to their designated status.
    pub fn submit(&self, message: &SyncmlMessage) -> SyncmlResponse {
        let phase = Phase::of(message);
        let state = SessionState::Dispatched(phase);
        debug!(
            phase = %phase,
            device_id = %message.device_uri(),
            session_id = message.header.session_id,
            msg_id = message.header.msg_id,
            "request classified"
        );

        let outcome = self.dispatch(phase, message);
        let state = state.finish(outcome.is_ok());

        match outcome {
            Ok(payload) => {
                debug!(phase = %phase, bytes = payload.len(), "reply generated");
                SyncmlResponse {
                    status: HttpStatus::Ok,
                    body: payload,
                    state,
                }
            }
            Err(err) => Self::failure(phase, message, err),
        }
    }

    /// Logs a failed request and builds its response.
    fn failure(phase: Phase, message: &SyncmlMessage, err: ServerError) -> SyncmlResponse {
        let status = err.status();
        if err.is_server_error() {
            error!(
                phase = %phase,
                device_id = %message.device_uri(),
                status = status.code(),
                error = %err.report(),
                "request failed"
            );
        } else {
            warn!(
                phase = %phase,
                device_id = %message.device_uri(),
                status = status.code(),
                error = %err.report(),
                "request rejected"
            );
        }
        SyncmlResponse::error(phase, status, err.to_string())
    }

    fn dispatch(&self, phase: Phase, message: &SyncmlMessage) -> ServerResult<String> {
        match phase {
            Phase::InitialEnrollment => self.initial_enrollment(message),
            Phase::EnrollmentCompletion => self.enrollment_completion(message),
            Phase::Disenrollment => self.disenrollment(message),
            Phase::OperationExchange => self.operation_exchange(message),
            Phase::Malformed => Err(ServerError::UnrecognizedPhase {
                msg_id: message.header.msg_id,
                session_id: message.header.session_id,
            }),
        }
    }

    fn initial_enrollment(&self, message: &SyncmlMessage) -> ServerResult<String> {
        self.authenticate(message)?;
        self.enrollment.enroll(message)?;
        self.replies
            .generate(message, Some(&device_info_operations()))
    }

    fn enrollment_completion(&self, message: &SyncmlMessage) -> ServerResult<String> {
        self.enrollment.complete(message)?;
        self.replies.generate(message, None)
    }

    fn disenrollment(&self, message: &SyncmlMessage) -> ServerResult<String> {
        self.disenrollment.disenroll(message)?;
        self.replies.generate(message, None)
    }

    fn operation_exchange(&self, message: &SyncmlMessage) -> ServerResult<String> {
        let device_id = message.device_uri();

        self.context
            .operations
            .update_statuses(device_id, &message.body.statuses)
            .map_err(ServerError::OperationSourceUnavailable)?;

        let pending = self
            .context
            .operations
            .pending_operations(message)
            .map_err(ServerError::OperationSourceUnavailable)?;

        let payload = self.replies.generate(message, Some(&pending))?;

        self.context
            .notifications
            .mark_delivered(device_id, &pending)
            .map_err(ServerError::NotificationUnavailable)?;

        self.context
            .operations
            .mark_in_progress(device_id, &pending)
            .map_err(ServerError::OperationSourceUnavailable)?;

        if !pending.is_empty() {
            info!(device_id = %device_id, count = pending.len(), "operations delivered");
        }
        Ok(payload)
    }

    /// Checks the header credential against the credential cache.
    fn authenticate(&self, message: &SyncmlMessage) -> ServerResult<()> {
        let token = message
            .header
            .credential
            .as_ref()
            .map(|c| c.data.as_str())
            .ok_or_else(|| ServerError::AuthenticationFailure("no credential".to_string()))?;

        let cached = self
            .context
            .credentials
            .lookup(token)
            .map_err(ServerError::CredentialCacheUnavailable)?
            .ok_or_else(|| {
                ServerError::AuthenticationFailure("unknown or expired credential".to_string())
            })?;

        if cached.username != message.user() {
            return Err(ServerError::AuthenticationFailure(format!(
                "credential was not issued to {}",
                message.user()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{
        InMemoryCredentialCache, InMemoryDeviceRegistry, InMemoryNotificationService,
        InMemoryOperationQueue, StaticPolicyEvaluator,
    };
    use syncml_protocol::{Item, Source, SyncmlBody, SyncmlHeader};

    const DEVICE: &str = "urn:uuid:driver-test";

    fn driver() -> (Arc<InMemoryCredentialCache>, SessionDriver) {
        let credentials = Arc::new(InMemoryCredentialCache::default());
        let context = DriverContext::new(
            DriverConfig::default(),
            credentials.clone(),
            Arc::new(InMemoryDeviceRegistry::new()),
            Arc::new(InMemoryOperationQueue::new()),
            Arc::new(InMemoryNotificationService::new()),
            Arc::new(StaticPolicyEvaluator::new()),
        );
        (credentials, SessionDriver::new(Arc::new(context)))
    }

    fn enrollment(token: Option<&str>, user: &str) -> SyncmlMessage {
        let mut header = SyncmlHeader::new(1, 1, Source::new(DEVICE, user));
        if let Some(token) = token {
            header = header.with_credential(token);
        }
        let items = [DEVICE, "Contoso", "Lumia", "10.0", "en-US"]
            .iter()
            .map(|v| Item::new(*v))
            .collect();
        SyncmlMessage::new(header).with_body(SyncmlBody::default().with_replace(items))
    }

    #[test]
    fn enrollment_requires_credential() {
        let (_, driver) = driver();
        let response = driver.submit(&enrollment(None, "alice"));
        assert_eq!(response.status, HttpStatus::Unauthorized);
        assert_eq!(response.state, SessionState::Failed(Phase::InitialEnrollment));
    }

    #[test]
    fn credential_must_match_user() {
        let (credentials, driver) = driver();
        credentials.insert("tok", "bob");

        let response = driver.submit(&enrollment(Some("tok"), "alice"));
        assert_eq!(response.status, HttpStatus::Unauthorized);
    }

    #[test]
    fn valid_credential_enrolls() {
        let (credentials, driver) = driver();
        credentials.insert("tok", "alice");

        let response = driver.submit(&enrollment(Some("tok"), "alice"));
        assert!(response.is_ok());
        assert_eq!(response.state, SessionState::Succeeded(Phase::InitialEnrollment));
        assert!(response.body.contains("<Get>"));
    }

    #[test]
    fn unknown_counters_are_bad_request() {
        let (_, driver) = driver();
        let message = SyncmlMessage::new(SyncmlHeader::new(0, 3, Source::new(DEVICE, "alice")));

        let response = driver.submit(&message);
        assert_eq!(response.status, HttpStatus::BadRequest);
        assert_eq!(response.state, SessionState::Failed(Phase::Malformed));
    }
}
