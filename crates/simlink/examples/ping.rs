//! Connect to a running simulator, check versions and list its vehicles.
//!
//! `cargo run --example ping -- [host] [port]`

use futures_lite::future::block_on;
use simlink::{ConnectionSettings, DEFAULT_HOST, DEFAULT_PORT, SimClient, Vehicle};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| DEFAULT_HOST.to_owned());
    let port = args.next().and_then(|port| port.parse().ok()).unwrap_or(DEFAULT_PORT);

    if let Err(err) = block_on(run(ConnectionSettings::new(host, port))) {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(settings: ConnectionSettings) -> simlink::Result<()> {
    let mut client = SimClient::generic(settings);
    client.connect().await?;

    let versions = client.confirm_connection().await?;
    info!(
        "Server version {}, client version {}, compatible: {}",
        versions.server_version,
        versions.client_version,
        versions.is_compatible()
    );

    for vehicle in client.get_vehicles().await? {
        let pose = vehicle.pose().await?;
        info!("{} at {:?}", vehicle.name(), pose.position);
    }

    client.close();
    Ok(())
}
