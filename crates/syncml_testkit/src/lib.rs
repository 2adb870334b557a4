//! # SyncML Testkit
//!
//! Test utilities for the SyncML session core.
//!
//! This crate provides:
//! - Canned requests for every protocol phase
//! - A server wired to in-memory collaborators
//! - A failing collaborator for error-path tests
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syncml_testkit::prelude::*;
//!
//! #[test]
//! fn enrolls() {
//!     let backend = TestBackend::new();
//!     assert!(backend.enroll(DEVICE_ID).is_ok());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
