//! # Rowswap Wire
//!
//! Codec for the three UDP sub-protocols of the rowswap framework. Pure and
//! stateless: every function maps bytes to typed messages or back, nothing
//! here touches a socket.
//!
//! Each message is a single length-prefixed UTF-8 text frame per datagram
//! (one frame per packet, no multi-packet messages), except registration
//! responses which are a bare 4-byte big-endian result code.
//!
//! Modules:
//! - [`frame`] — length-prefixed text frames and the 4-byte integer frame
//! - [`registration`] — `REGISTER`/`DISMISS` commands and result codes
//! - [`lookup`] — name resolution requests and tagged replies
//! - [`swap`] — line-exchange requests and outcome sentinels

pub mod frame;
pub mod lookup;
pub mod registration;
pub mod swap;

pub use frame::MAX_DATAGRAM;
pub use lookup::LookupReply;
pub use registration::{Command, RegistrationRequest, RequestParseError, ResultCode};
pub use swap::SwapRequest;
