//! Registration protocol handler.
//!
//! A strictly sequential loop bound to the registry's registration port:
//! receive one datagram, decode, validate, mutate the directory, reply with
//! a result code, then accept the next request. No state survives across
//! requests; the directory is the only shared state.
//!
//! A malformed individual request is answered with a result code and never
//! terminates the handler. Socket-layer failures (receive, send, frame
//! decode on this integer-response protocol) are fatal and surface as a
//! [`TransportError`] to the composing server.

use rowswap_common::TransportError;
use rowswap_wire::frame;
use rowswap_wire::registration::{
    Command, RegistrationRequest, RequestParseError, ResultCode,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::storage::{DismissOutcome, RegisterOutcome, ServiceDirectory};

/// Server-side loop answering REGISTER / DISMISS datagrams.
pub struct RegistrationHandler {
    socket: UdpSocket,
    directory: Arc<ServiceDirectory>,
}

impl RegistrationHandler {
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

            let code = match frame::decode_text(&buf[..len]) {
                Ok(text) => self.handle_request(text, peer),
                Err(source) => return Err(TransportError::Decode { source }),
            };

            self.socket
                .send_to(&code.encode(), peer)
                .await
                .map_err(|source| TransportError::Send { peer, source })?;
        }
    }

    /// Parses one request and applies it to the directory.
    fn handle_request(&self, text: &str, peer: SocketAddr) -> ResultCode {
        let request = match RegistrationRequest::parse(text) {
            Ok(request) => request,
            Err(RequestParseError::UnknownCommand(token)) => {
                debug!("Unknown command '{}' from {}", token, peer);
                return ResultCode::UnknownCommand;
            }
            Err(RequestParseError::Malformed(reason)) => {
                debug!("Malformed request from {}: {}", peer, reason);
                return ResultCode::MalformedRequest;
            }
        };

        let endpoint = request.endpoint(peer);
        let code = match request.command {
            Command::Register => {
                match self.directory.register_if_free(request.name.clone(), endpoint) {
                    RegisterOutcome::Registered => ResultCode::Ok,
                    RegisterOutcome::NameInUse => ResultCode::FilenameInUse,
                    RegisterOutcome::EndpointInUse => ResultCode::EndpointInUse,
                }
            }
            Command::Dismiss => match self.directory.dismiss_if_owned(&request.name, endpoint) {
                DismissOutcome::Dismissed => ResultCode::Ok,
                DismissOutcome::NameNotRegistered => ResultCode::FilenameNotInUse,
                DismissOutcome::EndpointMismatch => ResultCode::EndpointMismatch,
            },
        };

        debug!(
            "{} {} at {} from {} -> {}",
            request.command, request.name, endpoint, peer, code
        );
        code
    }
}
