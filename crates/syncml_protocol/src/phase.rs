//! Session classification.
//!
//! SyncML messages do not say which role they play in the enrollment
//! handshake. The role is derived from the message id, the session id and
//! the alert content, in this order:
//!
//! | Condition | Phase |
//! |---|---|
//! | `msg_id == 1 && session_id == 1` | [`Phase::InitialEnrollment`] |
//! | `msg_id == 2 && session_id == 1` | [`Phase::EnrollmentCompletion`] |
//! | `session_id >= 2` and the alert is the disenroll sentinel | [`Phase::Disenrollment`] |
//! | `session_id >= 2` otherwise | [`Phase::OperationExchange`] |
//! | anything else | [`Phase::Malformed`] |

use crate::constants::{
    DISENROLL_ALERT_DATA, FIRST_MESSAGE_ID, FIRST_SESSION_ID, SECOND_MESSAGE_ID,
    SECOND_SESSION_ID,
};
use crate::message::SyncmlMessage;
use std::fmt;

/// The protocol phase a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// First enrollment message: create the device and ask for device info.
    InitialEnrollment,
    /// Second enrollment message: enrich the device with the requested info.
    EnrollmentCompletion,
    /// The client asked to be removed from management.
    Disenrollment,
    /// Steady-state delivery of pending operations.
    OperationExchange,
    /// The counters do not match any known phase.
    Malformed,
}

impl Phase {
    /// Classifies a request from its counters and alert data.
    pub fn classify(msg_id: u32, session_id: u32, alert: Option<&str>) -> Self {
        if msg_id == FIRST_MESSAGE_ID && session_id == FIRST_SESSION_ID {
            Phase::InitialEnrollment
        } else if msg_id == SECOND_MESSAGE_ID && session_id == FIRST_SESSION_ID {
            Phase::EnrollmentCompletion
        } else if session_id >= SECOND_SESSION_ID {
            match alert {
                Some(data) if data == DISENROLL_ALERT_DATA => Phase::Disenrollment,
                _ => Phase::OperationExchange,
            }
        } else {
            Phase::Malformed
        }
    }

    /// Classifies a parsed message.
    pub fn of(message: &SyncmlMessage) -> Self {
        Self::classify(
            message.header.msg_id,
            message.header.session_id,
            message.alert_data(),
        )
    }

    /// Returns a stable name for logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::InitialEnrollment => "initial-enrollment",
            Phase::EnrollmentCompletion => "enrollment-completion",
            Phase::Disenrollment => "disenrollment",
            Phase::OperationExchange => "operation-exchange",
            Phase::Malformed => "malformed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
