//! Error types for the rowswap framework.
//!
//! Two layers of failure live here:
//!
//! - [`FrameError`]: a datagram payload could not be encoded or decoded.
//!   At the request path of a handler this usually degrades into a
//!   protocol-level "malformed" reply; at the response path it is fatal.
//! - [`TransportError`]: the communication channel itself is broken
//!   (bind/receive/send failures, or a response frame that cannot be
//!   produced). Handlers surface these to the composing server, which
//!   propagates them to the supervising binary; the library never
//!   terminates the process itself.

use std::net::SocketAddr;
use thiserror::Error;

/// Frame-level codec failure.
#[derive(Debug, Error)]
pub enum FrameError {
    /// Encoding would exceed the fixed datagram bound. Encoding fails
    /// loudly rather than silently truncating.
    #[error("frame of {len} bytes exceeds the {max}-byte datagram bound")]
    Oversize { len: usize, max: usize },

    /// The datagram is too short to carry a length prefix.
    #[error("datagram of {len} bytes is too short for a length prefix")]
    Truncated { len: usize },

    /// The length prefix claims more payload than the datagram carries.
    #[error("length prefix of {declared} bytes overruns the {available}-byte datagram body")]
    LengthOverrun { declared: usize, available: usize },

    /// The frame payload is not valid UTF-8.
    #[error("frame payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A result-code frame must be exactly four bytes.
    #[error("result-code frame must be exactly 4 bytes, got {len}")]
    BadResultCodeFrame { len: usize },

    /// The integer in a result-code frame maps to no known result code.
    #[error("unknown result code {0}")]
    UnknownResultCode(i32),
}

/// Socket-layer failure. Fatal to the owning handler loop.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The UDP socket could not be bound.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// A datagram could not be received.
    #[error("failed to receive datagram: {source}")]
    Receive { source: std::io::Error },

    /// A datagram could not be sent.
    #[error("failed to send datagram to {peer}: {source}")]
    Send {
        peer: SocketAddr,
        source: std::io::Error,
    },

    /// A response frame could not be encoded.
    #[error("failed to encode frame: {source}")]
    Encode { source: FrameError },

    /// A frame could not be decoded where the protocol treats that as a
    /// channel failure rather than a malformed request.
    #[error("failed to decode frame: {source}")]
    Decode { source: FrameError },
}
