//! # SyncML Server
//!
//! Session core of a SyncML (OMA-DM) device management endpoint.
//!
//! This crate provides:
//! - Per-request phase dispatch (enrollment, completion, disenrollment,
//!   operation exchange)
//! - Credential checks against a short-lived token cache
//! - Device record creation and enrichment
//! - Reply building from pending operations and effective policies
//! - A single error type mapped onto transport statuses
//!
//! # Architecture
//!
//! The core is stateless between requests. Devices, credentials, operations,
//! notifications and policies live behind collaborator traits; in-memory
//! implementations are provided for tests and single-process use.
//!
//! ```rust,ignore
//! use syncml_server::{DriverConfig, SyncmlServer};
//!
//! let (server, services) = SyncmlServer::in_memory(DriverConfig::default());
//! services.credentials.insert(token, user);
//! let response = server.submit_raw(&payload);
//! ```
//!
//! # Protocol
//!
//! A device enrolls in session 1 with two messages: message 1 creates the
//! device and the reply requests device info, message 2 delivers that info.
//! Later sessions either disenroll (alert `com.microsoft:mdm.unenrollment.userrequest`)
//! or exchange operations: statuses for the previous delivery come in,
//! pending operations go out.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod collaborators;
mod config;
mod device;
mod disenroll;
mod driver;
mod enrollment;
mod error;
mod memory;
mod reply;
mod server;
mod status;

pub use collaborators::{
    CachedCredential, CredentialCache, DeviceRegistry, NotificationService, OperationSource,
    Policy, PolicyEvaluator, PolicyFeature, ServiceError, ServiceResult,
};
pub use config::{DriverConfig, EmptyPropertiesPolicy};
pub use device::{DeviceRecord, EnrolmentInfo, EnrolmentStatus, Ownership};
pub use disenroll::DisenrollmentHandler;
pub use driver::{DriverContext, SessionDriver};
pub use enrollment::EnrollmentCoordinator;
pub use error::{ServerError, ServerResult};
pub use memory::{
    InMemoryCredentialCache, InMemoryDeviceRegistry, InMemoryNotificationService,
    InMemoryOperationQueue, StaticPolicyEvaluator,
};
pub use reply::OperationReplyBuilder;
pub use server::{InMemoryServices, SyncmlServer};
pub use status::{HttpStatus, SessionState, SyncmlResponse};
