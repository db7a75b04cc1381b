//! Lookup protocol handler.
//!
//! Answers client name-resolution queries against the directory. Always
//! replies: a name with no live entry gets an explicit `NOT_FOUND` reply,
//! which is a valid negative result, not an error.

use rowswap_common::TransportError;
use rowswap_wire::frame;
use rowswap_wire::lookup::{self, LookupReply};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::storage::ServiceDirectory;

/// Server-side loop answering name-resolution datagrams.
pub struct LookupHandler {
    socket: UdpSocket,
    directory: Arc<ServiceDirectory>,
}

impl LookupHandler {
    /// Binds the handler to `addr`.
    pub async fn bind(
        addr: SocketAddr,
        directory: Arc<ServiceDirectory>,
    ) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        Ok(Self { socket, directory })
    }

    /// Returns the address the handler is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.socket.local_addr()
    }

    /// Runs the receive loop until a transport failure.
    pub async fn run(self) -> Result<(), TransportError> {
        let mut buf = [0u8; frame::MAX_DATAGRAM];

        loop {
            let (len, peer) = self
                .socket
                .recv_from(&mut buf)
                .await
                .map_err(|source| TransportError::Receive { source })?;

            let name = lookup::decode_request(&buf[..len])
                .map_err(|source| TransportError::Decode { source })?;

            let reply = match self.directory.lookup(&name) {
                Some(endpoint) => LookupReply::Found(endpoint),
                None => LookupReply::NotFound,
            };
            debug!("Lookup '{}' from {} -> {}", name, peer, reply.render());

            let response = reply
                .encode()
                .map_err(|source| TransportError::Encode { source })?;
            self.socket
                .send_to(&response, peer)
                .await
                .map_err(|source| TransportError::Send { peer, source })?;
        }
    }
}
