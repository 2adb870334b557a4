//! Transport-level responses.

use std::fmt;
use syncml_protocol::Phase;

/// HTTP status of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpStatus {
    /// 200.
    Ok,
    /// 304.
    NotModified,
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 404.
    NotFound,
    /// 500.
    InternalServerError,
}

impl HttpStatus {
    /// Returns the numeric code.
    pub fn code(&self) -> u16 {
        match self {
            HttpStatus::Ok => 200,
            HttpStatus::NotModified => 304,
            HttpStatus::BadRequest => 400,
            HttpStatus::Unauthorized => 401,
            HttpStatus::NotFound => 404,
            HttpStatus::InternalServerError => 500,
        }
    }

    /// Returns true for 4xx codes.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.code())
    }

    /// Returns true for 5xx codes.
    pub fn is_server_error(&self) -> bool {
        self.code() >= 500
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Where a request ended up in the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The request has not been classified yet.
    AwaitingClassification,
    /// The request was routed to a phase handler.
    Dispatched(Phase),
    /// The phase handler completed.
    Succeeded(Phase),
    /// The phase handler (or classification) failed.
    Failed(Phase),
}

impl SessionState {
    /// Advances a dispatched state to its terminal state.
    pub fn finish(self, success: bool) -> Self {
        match self {
            SessionState::Dispatched(phase) if success => SessionState::Succeeded(phase),
            SessionState::Dispatched(phase) => SessionState::Failed(phase),
            SessionState::AwaitingClassification => SessionState::Failed(Phase::Malformed),
            terminal => terminal,
        }
    }
}

/// The single response produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncmlResponse {
    /// HTTP status.
    pub status: HttpStatus,
    /// Serialized SyncML payload, or plain error text.
    pub body: String,
    /// Terminal session state.
    pub state: SessionState,
}

impl SyncmlResponse {
    /// An error response carrying plain text.
    pub fn error(phase: Phase, status: HttpStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            body: message.into(),
            state: SessionState::Failed(phase),
        }
    }

    /// Returns true for a 200 response.
    pub fn is_ok(&self) -> bool {
        self.status == HttpStatus::Ok
    }
}
