//! # Rowswap Client
//!
//! Client-side operations for the rowswap protocols:
//!
//! - [`DiscoveryClient`] resolves a service name to an endpoint through the
//!   registry's lookup protocol.
//! - [`SwapClient`] sends swap requests directly to a resolved service.
//!
//! The interactive line-entry loop lives in the `rowswap-client` binary and
//! is a thin wrapper over these operations.

use rowswap_common::{ServiceName, TransportError};
use rowswap_wire::frame;
use rowswap_wire::lookup::{self, LookupReply};
use rowswap_wire::swap::{SwapRequest, OUTCOME_OK};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::debug;

/// Why a client exchange failed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A reply arrived but could not be interpreted.
    #[error("malformed reply from {peer}: {reason}")]
    MalformedReply { peer: SocketAddr, reason: String },

    /// The exchange itself broke down.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

async fn bind_toward(peer: SocketAddr) -> Result<UdpSocket, TransportError> {
    let bind_addr = if peer.is_ipv4() {
        SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0))
    };
    UdpSocket::bind(bind_addr)
        .await
        .map_err(|source| TransportError::Bind {
            addr: bind_addr,
            source,
        })
}

async fn exchange(
    socket: &UdpSocket,
    peer: SocketAddr,
    datagram: &[u8],
    buf: &mut [u8],
) -> Result<usize, TransportError> {
    socket
        .send_to(datagram, peer)
        .await
        .map_err(|source| TransportError::Send { peer, source })?;
    let (len, _) = socket
        .recv_from(buf)
        .await
        .map_err(|source| TransportError::Receive { source })?;
    Ok(len)
}

/// Resolves service names against the registry's lookup endpoint.
pub struct DiscoveryClient {
    socket: UdpSocket,
    lookup_addr: SocketAddr,
}

impl DiscoveryClient {
    /// Creates a client for the registry's lookup address.
    pub async fn connect(lookup_addr: SocketAddr) -> Result<Self, TransportError> {
        Ok(Self {
            socket: bind_toward(lookup_addr).await?,
            lookup_addr,
        })
    }

    /// Resolves `name` to its registered endpoint.
    ///
    /// A [`LookupReply::NotFound`] is a valid negative result, not an
    /// error.
    pub async fn resolve(&self, name: &ServiceName) -> Result<LookupReply, ClientError> {
        let request = lookup::encode_request(name)
            .map_err(|source| TransportError::Encode { source })?;

        let mut buf = [0u8; frame::MAX_DATAGRAM];
        let len = exchange(&self.socket, self.lookup_addr, &request, &mut buf).await?;

        let text = frame::decode_text(&buf[..len])
            .map_err(|source| TransportError::Decode { source })?;
        let reply = LookupReply::parse(text).map_err(|e| ClientError::MalformedReply {
            peer: self.lookup_addr,
            reason: e.to_string(),
        })?;

        debug!("Resolved '{}' -> {}", name, reply.render());
        Ok(reply)
    }
}

/// Sends swap requests to one resolved row-swap service.
pub struct SwapClient {
    socket: UdpSocket,
    service_addr: SocketAddr,
}

impl SwapClient {
    /// Creates a client for a resolved service endpoint.
    pub async fn connect(service_addr: SocketAddr) -> Result<Self, TransportError> {
        Ok(Self {
            socket: bind_toward(service_addr).await?,
            service_addr,
        })
    }

    /// Requests the exchange of lines `line1` and `line2`, returning the
    /// service's outcome text.
    ///
    /// Exchanging a line with itself is a no-op; the request is answered
    /// locally with the success sentinel and never reaches the service.
    pub async fn swap(&self, line1: u64, line2: u64) -> Result<String, ClientError> {
        if line1 == line2 {
            return Ok(OUTCOME_OK.to_string());
        }

        let request = SwapRequest::new(line1, line2)
            .encode()
            .map_err(|source| TransportError::Encode { source })?;

        let mut buf = [0u8; frame::MAX_DATAGRAM];
        let len = exchange(&self.socket, self.service_addr, &request, &mut buf).await?;

        let outcome = frame::decode_text(&buf[..len])
            .map_err(|source| TransportError::Decode { source })?;
        Ok(outcome.to_string())
    }
}
