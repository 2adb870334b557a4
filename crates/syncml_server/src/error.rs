//! Error types for the session core.

use crate::collaborators::ServiceError;
use crate::status::HttpStatus;
use syncml_protocol::ProtocolError;
use thiserror::Error;

/// Result type for session operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can end a request.
///
/// Every variant maps to exactly one [`HttpStatus`]; collaborator failures
/// keep the originating [`ServiceError`] as their source.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The payload could not be parsed or lacks required items.
    #[error("malformed payload")]
    MalformedPayload(#[source] ProtocolError),

    /// The message/session counters match no phase.
    #[error("unrecognized message {msg_id} in session {session_id}")]
    UnrecognizedPhase {
        /// Message id of the request.
        msg_id: u32,
        /// Session id of the request.
        session_id: u32,
    },

    /// The credential does not belong to the claimed user.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    /// The registry refused to create the device.
    #[error("enrollment failed: {0}")]
    EnrollmentFailure(String),

    /// The registry refused to update the device.
    #[error("enrollment modification failed: {0}")]
    ModificationFailure(String),

    /// Completion arrived before the device was ready; the client should resend.
    #[error("enrollment completion pending: {0}")]
    CompletionPending(String),

    /// The device is not enrolled.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The registry refused to remove the device.
    #[error("disenrollment failed: {0}")]
    DisenrollmentFailure(String),

    /// Credential cache failure.
    #[error("credential cache unavailable")]
    CredentialCacheUnavailable(#[source] ServiceError),

    /// Device registry failure.
    #[error("device registry unavailable")]
    RegistryUnavailable(#[source] ServiceError),

    /// Operation queue failure.
    #[error("operation source unavailable")]
    OperationSourceUnavailable(#[source] ServiceError),

    /// Effective policy lookup failure.
    #[error("policy service unavailable")]
    PolicyUnavailable(#[source] ServiceError),

    /// Feature support lookup failure.
    #[error("feature service unavailable")]
    FeatureUnavailable(#[source] ServiceError),

    /// Notification bookkeeping failure.
    #[error("notification service unavailable")]
    NotificationUnavailable(#[source] ServiceError),

    /// Reply encoding failure.
    #[error("encoding failed")]
    EncodingFailure(#[source] ProtocolError),
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        if err.is_request_error() {
            ServerError::MalformedPayload(err)
        } else {
            ServerError::EncodingFailure(err)
        }
    }
}

impl ServerError {
    /// Returns the transport status designated for this error.
    pub fn status(&self) -> HttpStatus {
        match self {
            ServerError::MalformedPayload(_) | ServerError::UnrecognizedPhase { .. } => {
                HttpStatus::BadRequest
            }
            ServerError::AuthenticationFailure(_) => HttpStatus::Unauthorized,
            ServerError::ModificationFailure(_) | ServerError::CompletionPending(_) => {
                HttpStatus::NotModified
            }
            ServerError::DeviceNotFound(_) => HttpStatus::NotFound,
            ServerError::EnrollmentFailure(_)
            | ServerError::DisenrollmentFailure(_)
            | ServerError::CredentialCacheUnavailable(_)
            | ServerError::RegistryUnavailable(_)
            | ServerError::OperationSourceUnavailable(_)
            | ServerError::PolicyUnavailable(_)
            | ServerError::FeatureUnavailable(_)
            | ServerError::NotificationUnavailable(_)
            | ServerError::EncodingFailure(_) => HttpStatus::InternalServerError,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Formats the error with its source chain, for logs.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
