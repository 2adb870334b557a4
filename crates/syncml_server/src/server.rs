//! Server façade.

use crate::config::DriverConfig;
use crate::driver::{DriverContext, SessionDriver};
use crate::error::ServerError;
use crate::memory::{
    InMemoryCredentialCache, InMemoryDeviceRegistry, InMemoryNotificationService,
    InMemoryOperationQueue, StaticPolicyEvaluator,
};
use crate::status::SyncmlResponse;
use std::sync::Arc;
use syncml_protocol::{JsonMessageParser, MessageParser, Phase, SyncmlMessage};
use tracing::warn;

/// Handles to the in-memory collaborators of a server built with
/// [`SyncmlServer::in_memory`].
#[derive(Clone)]
pub struct InMemoryServices {
    /// Credential cache.
    pub credentials: Arc<InMemoryCredentialCache>,
    /// Device registry.
    pub registry: Arc<InMemoryDeviceRegistry>,
    /// Operation queue.
    pub operations: Arc<InMemoryOperationQueue>,
    /// Notification bookkeeping.
    pub notifications: Arc<InMemoryNotificationService>,
    /// Policy evaluator.
    pub policy: Arc<StaticPolicyEvaluator>,
}

impl InMemoryServices {
    /// Creates empty services configured from `config`.
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            credentials: Arc::new(InMemoryCredentialCache::new(config.credential_ttl())),
            registry: Arc::new(InMemoryDeviceRegistry::new()),
            operations: Arc::new(InMemoryOperationQueue::new()),
            notifications: Arc::new(InMemoryNotificationService::new()),
            policy: Arc::new(StaticPolicyEvaluator::new()),
        }
    }

    /// Builds a driver context over these services.
    pub fn context(&self, config: DriverConfig) -> DriverContext {
        DriverContext::new(
            config,
            self.credentials.clone(),
            self.registry.clone(),
            self.operations.clone(),
            self.notifications.clone(),
            self.policy.clone(),
        )
    }
}

/// The SyncML management endpoint.
///
/// Accepts one request at a time per call and returns exactly one response.
/// The server is `Send + Sync`; concurrent requests share only the
/// collaborators.
///
/// # Example
///
/// ```
/// use syncml_server::{DriverConfig, HttpStatus, SyncmlServer};
///
/// let (server, services) = SyncmlServer::in_memory(DriverConfig::default());
/// services.credentials.insert("token", "alice");
///
/// // Session 1 / message 3 matches no phase.
/// let raw = br#"{"header":{"session_id":1,"msg_id":3,"source":{"loc_uri":"dev","loc_name":"alice"}}}"#;
/// assert_eq!(server.submit_raw(raw).status, HttpStatus::BadRequest);
/// ```
pub struct SyncmlServer {
    driver: SessionDriver,
    context: Arc<DriverContext>,
    parser: Arc<dyn MessageParser>,
}

impl SyncmlServer {
    /// Creates a server over the given collaborators.
    pub fn new(context: DriverContext) -> Self {
        let context = Arc::new(context);
        let driver = SessionDriver::new(Arc::clone(&context));

        Self {
            driver,
            context,
            parser: Arc::new(JsonMessageParser),
        }
    }

    /// Creates a server backed by fresh in-memory collaborators.
    pub fn in_memory(config: DriverConfig) -> (Self, InMemoryServices) {
        let services = InMemoryServices::new(&config);
        let server = Self::new(services.context(config));
        (server, services)
    }

    /// Replaces the raw payload parser.
    pub fn with_parser(mut self, parser: Arc<dyn MessageParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Processes a parsed request.
    pub fn submit(&self, message: &SyncmlMessage) -> SyncmlResponse {
        self.driver.submit(message)
    }

    /// Parses and processes a raw request.
    ///
    /// Payloads the parser rejects get a 400 without reaching any phase.
    pub fn submit_raw(&self, raw: &[u8]) -> SyncmlResponse {
        match self.parser.parse(raw) {
            Ok(message) => self.submit(&message),
            Err(err) => {
                let err = ServerError::from(err);
                warn!(status = err.status().code(), error = %err.report(), "unparseable request");
                SyncmlResponse::error(Phase::Malformed, err.status(), err.to_string())
            }
        }
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.context.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{HttpStatus, SessionState};

    #[test]
    fn garbage_is_bad_request() {
        let (server, _) = SyncmlServer::in_memory(DriverConfig::default());

        let response = server.submit_raw(b"<SyncML><SyncHdr>");
        assert_eq!(response.status, HttpStatus::BadRequest);
        assert_eq!(response.state, SessionState::Failed(Phase::Malformed));
        assert!(response.body.starts_with("malformed payload"));
    }

    #[test]
    fn config_is_kept() {
        let config = DriverConfig::new().with_device_type("windows-phone");
        let (server, _) = SyncmlServer::in_memory(config);
        assert_eq!(server.config().device_type, "windows-phone");
    }

    #[test]
    fn server_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncmlServer>();
    }
}
