//! Standalone discovery registry server.

use anyhow::{bail, Result};
use clap::Parser;
use rowswap_common::is_registrable_port;
use rowswap_discovery::DiscoveryServer;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info};

/// Discovery registry for rowswap services
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port receiving REGISTER/DISMISS requests from services
    #[arg(long, value_name = "PORT")]
    registration_port: u16,

    /// Port receiving name-resolution queries from clients
    #[arg(long, value_name = "PORT")]
    lookup_port: u16,

    /// Address to bind both sockets on
    #[arg(long, default_value = "0.0.0.0")]
    bind_address: IpAddr,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.debug);

    // Argument validation happens here, at the bootstrap layer; the server
    // only ever sees validated addresses.
    if !is_registrable_port(args.registration_port) {
        bail!(
            "invalid registration port {}: must be above 1024",
            args.registration_port
        );
    }
    if !is_registrable_port(args.lookup_port) {
        bail!("invalid lookup port {}: must be above 1024", args.lookup_port);
    }
    if args.registration_port == args.lookup_port {
        bail!("registration port and lookup port must differ");
    }

    let server = DiscoveryServer::bind(
        SocketAddr::new(args.bind_address, args.registration_port),
        SocketAddr::new(args.bind_address, args.lookup_port),
    )
    .await?;

    info!("Discovery registry starting");
    info!("Registration port: {}", args.registration_port);
    info!("Lookup port: {}", args.lookup_port);
    info!("Press Ctrl+C to stop");

    tokio::select! {
        res = server.run() => {
            // Only a transport failure gets here; the channel is broken and
            // there is no retry or reconnection, so the process terminates.
            if let Err(e) = res {
                error!("Transport failure, shutting down: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

fn initialize_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}
