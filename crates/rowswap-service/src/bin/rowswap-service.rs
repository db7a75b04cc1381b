//! Standalone row-swap service.

use anyhow::{bail, Context, Result};
use clap::Parser;
use rowswap_common::{is_registrable_port, ServiceName};
use rowswap_service::RowSwapService;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{error, info};

/// Row-swap service: registers a file name with the discovery registry and
/// serves atomic two-line exchanges on that file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Discovery registry address
    #[arg(long, value_name = "ADDR")]
    registry_address: IpAddr,

    /// Discovery registry registration port
    #[arg(long, value_name = "PORT")]
    registry_port: u16,

    /// Port this service listens on for swap requests
    #[arg(long, value_name = "PORT")]
    port: u16,

    /// Target file; its file name doubles as the registered service name
    #[arg(long, value_name = "FILE")]
    file: PathBuf,

    /// Address to advertise to the registry (defaults to the local address
    /// that routes toward the registry)
    #[arg(long, value_name = "ADDR")]
    advertised_address: Option<IpAddr>,

    /// Address to bind the swap socket on
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

    // Argument validation happens here, at the bootstrap layer; the core
    // receives validated addresses and a validated path.
    if !is_registrable_port(args.registry_port) {
        bail!(
            "invalid registry port {}: must be above 1024",
            args.registry_port
        );
    }
    if !is_registrable_port(args.port) {
        bail!("invalid service port {}: must be above 1024", args.port);
    }

    let name = match args.file.file_name().and_then(|n| n.to_str()) {
        Some(name) => ServiceName::from(name),
        None => bail!("target path {} has no file name", args.file.display()),
    };

    let registry = SocketAddr::new(args.registry_address, args.registry_port);
    let advertised_ip = match args.advertised_address {
        Some(ip) => ip,
        None => local_address_toward(registry)?,
    };

    let service = RowSwapService::start(
        registry,
        SocketAddr::new(args.bind_address, args.port),
        advertised_ip,
        name.clone(),
        &args.file,
    )
    .await?;

    info!("Row-swap service started");
    info!("Name: {}", name);
    info!("Advertised endpoint: {}", service.advertised());
    info!("Line count: {}", service.line_count());
    info!("Press Ctrl+C to stop");

    let (handler, mut discovery) = service.into_parts();

    tokio::select! {
        res = handler.run() => {
            // Only a transport failure gets here; the channel is broken and
            // there is no retry or reconnection, so the process terminates.
            if let Err(e) = res {
                error!("Transport failure, shutting down: {}", e);
                return Err(e.into());
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, dismissing registration");
            if let Err(e) = discovery.dismiss().await {
                error!("Dismissal failed: {}", e);
            }
            Ok(())
        }
    }
}

/// Picks the local address the OS would route toward `registry`; that is
/// the address remote clients can reach this host at in the common case.
fn local_address_toward(registry: SocketAddr) -> Result<IpAddr> {
    let probe = std::net::UdpSocket::bind(("0.0.0.0", 0))
        .context("failed to bind address-discovery probe socket")?;
    probe
        .connect(registry)
        .context("failed to route toward the registry")?;
    Ok(probe
        .local_addr()
        .context("failed to read probe socket address")?
        .ip())
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
