//! Interactive row-swap client.
//!
//! Resolves a service name through the discovery registry, then reads
//! `<line1>,<line2>` pairs from stdin and sends them as swap requests.
//! Thin wrapper: all protocol behavior lives in the `rowswap-client`
//! library.

use anyhow::{bail, Result};
use clap::Parser;
use rowswap_client::{DiscoveryClient, SwapClient};
use rowswap_common::{is_registrable_port, ServiceName};
use rowswap_wire::lookup::LookupReply;
use rowswap_wire::swap::SwapRequest;
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive client for row-swap services
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Discovery registry address
    #[arg(long, value_name = "ADDR")]
    registry_address: IpAddr,

    /// Discovery registry lookup port
    #[arg(long, value_name = "PORT")]
    lookup_port: u16,

    /// Service name (the target file's name) to resolve
    #[arg(long, value_name = "NAME")]
    name: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(args.debug);

    if !is_registrable_port(args.lookup_port) {
        bail!("invalid lookup port {}: must be above 1024", args.lookup_port);
    }
    let name = ServiceName::from(args.name);
    if name.is_blank() {
        bail!("service name must not be blank");
    }

    let lookup_addr = SocketAddr::new(args.registry_address, args.lookup_port);
    let discovery = DiscoveryClient::connect(lookup_addr).await?;

    let endpoint = match discovery.resolve(&name).await? {
        LookupReply::Found(endpoint) => endpoint,
        LookupReply::NotFound => bail!("no service registered under '{}'", name),
    };
    println!("'{}' is served at {}", name, endpoint);

    let swap = SwapClient::connect(endpoint.socket_addr()).await?;
    println!("Enter swaps as <line1>,<line2> (zero-based); 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        match SwapRequest::parse(line) {
            Ok(request) => {
                let outcome = swap.swap(request.line1, request.line2).await?;
                println!("{}", outcome);
            }
            Err(_) => println!("expected <line1>,<line2>, got '{}'", line),
        }
    }

    Ok(())
}

fn initialize_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();
}
