//! # Rowswap Discovery
//!
//! The discovery registry for rowswap services.
//!
//! This crate provides:
//! - The in-memory name→endpoint directory with its conflict rules
//! - The registration protocol handler (REGISTER / DISMISS over UDP)
//! - The lookup protocol handler (name resolution over UDP)
//! - A server composing both handlers, and the standalone executable
//!
//! The directory is the only state shared between the handlers; every
//! check-then-act sequence against it runs inside one mutual-exclusion
//! scope, so two concurrent registrations can never both claim the same
//! name or endpoint.

pub mod lookup;
pub mod registration;
pub mod server;
pub mod storage;

// Re-export commonly used items
pub use server::DiscoveryServer;
pub use storage::{DirectoryEntry, DismissOutcome, RegisterOutcome, ServiceDirectory};
