//! Core domain types used throughout the rowswap framework.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Lowest port number (exclusive) a row-swap service may register under.
///
/// Ports at or below this value are reserved for well-known services and are
/// rejected during request parsing.
pub const REGISTRABLE_PORT_FLOOR: u16 = 1024;

/// Returns true if `port` falls inside the registrable range.
pub fn is_registrable_port(port: u16) -> bool {
    port > REGISTRABLE_PORT_FLOOR
}

/// Logical name a row-swap service registers under.
///
/// The name is the filename the service operates on; it doubles as the
/// identity key in the discovery directory.
///
/// # Example
/// ```
/// use rowswap_common::ServiceName;
///
/// let name = ServiceName::from("report.txt");
/// assert_eq!(name.as_str(), "report.txt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a new ServiceName from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name is empty or whitespace-only.
    ///
    /// Blank names are never valid registration or lookup keys.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network endpoint a registered service can be reached at.
///
/// Two endpoints are equal iff both the address and the port match; the
/// discovery directory uses that equality to refuse a second name claiming
/// an endpoint already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// IP address the service is reachable at.
    pub address: IpAddr,

    /// UDP port the service listens on.
    pub port: u16,
}

impl Endpoint {
    /// Creates a new endpoint.
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }

    /// Converts the endpoint into a socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self {
            address: addr.ip(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
