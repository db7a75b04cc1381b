//! # Rowswap Service
//!
//! A row-swap service owns one text file and serves atomic two-line
//! exchanges over UDP. On startup it validates the file, counts its lines,
//! registers its name and endpoint with the discovery registry, then serves
//! swap requests indefinitely; on shutdown it dismisses its registration.
//!
//! This crate provides:
//! - [`SwapFile`] — the crash-safe line-exchange engine
//!   (temp-file-write-then-rename, never a half-written file)
//! - [`SwapHandler`] — the UDP loop decoding swap requests
//! - [`DiscoveryHandle`] — the registration client side of the discovery
//!   protocol
//! - [`RowSwapService`] — the composition of the three, plus the executable

pub mod discovery;
pub mod handler;
pub mod service;
pub mod swap_file;

// Re-export commonly used items
pub use discovery::{DiscoveryHandle, RegistrationError};
pub use handler::SwapHandler;
pub use service::{RowSwapService, ServiceError};
pub use swap_file::{SwapError, SwapFile};
