//! Client side of the registration protocol.
//!
//! A service advertises itself by sending an address-qualified REGISTER to
//! the registry's registration endpoint and blocking for the 4-byte result
//! code; DISMISS releases the claim on shutdown. There are no receive
//! timeouts and no retries here — a lost reply blocks the caller, which is
//! the documented transport model.

use rowswap_common::{Endpoint, ServiceName, TransportError};
use rowswap_wire::frame;
use rowswap_wire::registration::{Command, RegistrationRequest, ResultCode};
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info};

/// Why a registration exchange failed.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The registry answered with a non-OK result code.
    #[error("registry rejected {command} of '{name}': {code}")]
    Rejected {
        command: Command,
        name: ServiceName,
        code: ResultCode,
    },

    /// The exchange itself broke down.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A service's handle on its discovery registration.
#[derive(Debug)]
pub struct DiscoveryHandle {
    socket: UdpSocket,
    registry: SocketAddr,
    name: ServiceName,
    endpoint: Endpoint,
    registered: bool,
}

impl DiscoveryHandle {
    /// Creates a handle that will advertise `name` at `endpoint` to the
    /// registry's registration address.
    pub async fn connect(
        registry: SocketAddr,
        name: ServiceName,
        endpoint: Endpoint,
    ) -> Result<Self, TransportError> {
        let bind_addr = if registry.is_ipv4() {
            SocketAddr::from((std::net::Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: bind_addr,
                source,
            })?;

        Ok(Self {
            socket,
            registry,
            name,
            endpoint,
            registered: false,
        })
    }

    /// Returns the name this handle advertises.
    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    /// Returns the endpoint this handle advertises.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Returns true after a successful registration.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Registers the service. Idempotent: an already-registered handle
    /// returns without another exchange.
    pub async fn register(&mut self) -> Result<(), RegistrationError> {
        if self.registered {
            return Ok(());
        }

        let code = self.exchange(Command::Register).await?;
        if code == ResultCode::Ok {
            self.registered = true;
            info!("Registered '{}' at {}", self.name, self.endpoint);
            Ok(())
        } else {
            Err(RegistrationError::Rejected {
                command: Command::Register,
                name: self.name.clone(),
                code,
            })
        }
    }

    /// Dismisses the registration.
    ///
    /// A reply of OK, FILENAME NOT IN USE, or ENDPOINT NOT CONSISTENT all
    /// leave the handle unregistered — in each case the directory holds no
    /// entry of ours anymore. Returns the code for the caller's logs.
    pub async fn dismiss(&mut self) -> Result<ResultCode, RegistrationError> {
        if !self.registered {
            return Ok(ResultCode::Ok);
        }

        let code = self.exchange(Command::Dismiss).await?;
        match code {
            ResultCode::Ok | ResultCode::FilenameNotInUse | ResultCode::EndpointMismatch => {
                self.registered = false;
                info!("Dismissed '{}' from discovery ({})", self.name, code);
                Ok(code)
            }
            code => Err(RegistrationError::Rejected {
                command: Command::Dismiss,
                name: self.name.clone(),
                code,
            }),
        }
    }

    /// One request/response exchange with the registry.
    async fn exchange(&self, command: Command) -> Result<ResultCode, TransportError> {
        let request = RegistrationRequest::advertise(command, self.name.clone(), self.endpoint);
        let datagram = request
            .encode()
            .map_err(|source| TransportError::Encode { source })?;

        self.socket
            .send_to(&datagram, self.registry)
            .await
            .map_err(|source| TransportError::Send {
                peer: self.registry,
                source,
            })?;
        debug!("Sent {} for '{}' to {}", command, self.name, self.registry);

        let mut buf = [0u8; frame::MAX_DATAGRAM];
        let (len, _) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|source| TransportError::Receive { source })?;

        ResultCode::decode(&buf[..len]).map_err(|source| TransportError::Decode { source })
    }
}
