//! CLI command implementations.

pub mod classify;
pub mod device_info;
pub mod replay;
