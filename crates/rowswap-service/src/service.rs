//! Service composition: validate the file, bind the swap socket, register
//! with the discovery registry, then serve.

use rowswap_common::{Endpoint, ServiceName, TransportError};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::discovery::{DiscoveryHandle, RegistrationError};
use crate::handler::SwapHandler;
use crate::swap_file::{SwapError, SwapFile};

/// Why the service failed to start.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Startup validation of the target file failed; the service cannot
    /// become operational.
    #[error("target file validation failed: {0}")]
    File(#[from] SwapError),

    /// The discovery registry refused the registration.
    #[error("discovery registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// A socket could not be set up.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A fully started row-swap service: file validated, socket bound, name
/// registered.
#[derive(Debug)]
pub struct RowSwapService {
    handler: SwapHandler,
    discovery: DiscoveryHandle,
}

impl RowSwapService {
    /// Starts the service.
    ///
    /// Startup order matters: the target file is validated and scanned
    /// first, the swap socket is bound second, and registration happens
    /// last — a name only ever appears in the directory once the service
    /// behind it can actually answer. The advertised endpoint combines
    /// `advertised_address` with the port the swap socket actually bound.
    pub async fn start(
        registry: SocketAddr,
        bind: SocketAddr,
        advertised_address: IpAddr,
        name: ServiceName,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ServiceError> {
        let file = SwapFile::open(path).await?;
        info!(
            "Serving {} ({} lines)",
            file.path().display(),
            file.line_count()
        );

        let handler = SwapHandler::bind(bind, file).await?;
        let bound = handler
            .local_addr()
            .map_err(|source| TransportError::Bind { addr: bind, source })?;
        let advertised = Endpoint::new(advertised_address, bound.port());

        let mut discovery = DiscoveryHandle::connect(registry, name, advertised).await?;
        discovery.register().await?;

        Ok(Self { handler, discovery })
    }

    /// Returns the endpoint advertised to the registry.
    pub fn advertised(&self) -> Endpoint {
        self.discovery.endpoint()
    }

    /// Returns the address the swap socket is bound to.
    pub fn swap_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.handler.local_addr()
    }

    /// Returns the startup line count of the target file.
    pub fn line_count(&self) -> u64 {
        self.handler.line_count()
    }

    /// Splits the service into its serving loop and its registration
    /// handle, so a supervisor can dismiss on shutdown while the loop is
    /// consumed by `run`.
    pub fn into_parts(self) -> (SwapHandler, DiscoveryHandle) {
        (self.handler, self.discovery)
    }

    /// Serves swap requests until a transport failure.
    pub async fn run(self) -> Result<(), TransportError> {
        self.handler.run().await
    }
}
