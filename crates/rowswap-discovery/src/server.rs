//! Discovery server: composes the registration and lookup handlers over
//! one shared directory.
//!
//! Each handler runs as its own task with its own socket and sequential
//! loop; the handlers run concurrently with each other. The first transport
//! failure in either loop tears the server down — the typed error reaches
//! the supervising binary, which decides to exit.

use rowswap_common::TransportError;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::lookup::LookupHandler;
use crate::registration::RegistrationHandler;
use crate::storage::ServiceDirectory;

/// The discovery registry server.
pub struct DiscoveryServer {
    directory: Arc<ServiceDirectory>,
    registration: RegistrationHandler,
    lookup: LookupHandler,
}

impl DiscoveryServer {
    /// Binds both protocol handlers.
    ///
    /// `registration_addr` receives REGISTER/DISMISS requests from services;
    /// `lookup_addr` receives resolution queries from clients.
    pub async fn bind(
        registration_addr: SocketAddr,
        lookup_addr: SocketAddr,
    ) -> Result<Self, TransportError> {
        let directory = Arc::new(ServiceDirectory::new());
        let registration =
            RegistrationHandler::bind(registration_addr, Arc::clone(&directory)).await?;
        let lookup = LookupHandler::bind(lookup_addr, Arc::clone(&directory)).await?;

        Ok(Self {
            directory,
            registration,
            lookup,
        })
    }

    /// Returns the shared directory.
    pub fn directory(&self) -> &Arc<ServiceDirectory> {
        &self.directory
    }

    /// Returns the bound registration address.
    pub fn registration_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.registration.local_addr()
    }

    /// Returns the bound lookup address.
    pub fn lookup_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.lookup.local_addr()
    }

    /// Runs both handler loops until the first transport failure.
    pub async fn run(self) -> Result<(), TransportError> {
        info!(
            "Discovery server listening: registration on {:?}, lookup on {:?}",
            self.registration.local_addr(),
            self.lookup.local_addr()
        );

        // Both loops only return on failure; the first error tears down the
        // other loop with it.
        tokio::try_join!(self.registration.run(), self.lookup.run())?;
        Ok(())
    }
}
