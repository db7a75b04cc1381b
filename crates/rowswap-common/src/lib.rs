//! # Rowswap Common
//!
//! Shared domain types and error types for the rowswap framework.
//!
//! This crate provides:
//! - Core identifiers (`ServiceName`, `Endpoint`)
//! - Port range validation for registrable service ports
//! - Error types shared across the wire codec and the protocol handlers

pub mod errors;
pub mod types;

// Re-export commonly used items
pub use errors::{FrameError, TransportError};
pub use types::{is_registrable_port, Endpoint, ServiceName, REGISTRABLE_PORT_FLOOR};
