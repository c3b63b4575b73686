//! Detect cylinders in front of the first vehicle.
//!
//! `cargo run --example object_detection -- [mesh pattern]`

use std::thread;
use std::time::Duration;

use futures_lite::future::block_on;
use simlink::{ConnectionSettings, DetectionSearch, SimClient, Vehicle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mesh = std::env::args().nth(1).unwrap_or_else(|| "Cylinder*".to_owned());
    if let Err(err) = block_on(run(&mesh)) {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(mesh: &str) -> simlink::Result<()> {
    let mut client = SimClient::generic(ConnectionSettings::default());
    client.connect().await?;

    let Some(vehicle) = client.get_vehicles().await?.into_iter().next() else {
        warn!("No vehicle in the simulation");
        return Ok(());
    };

    let search = DetectionSearch::new("front_center", mesh).with_radius_cm(20_000.0);
    vehicle.start_detection(&search).await?;

    for _ in 0..10 {
        for detection in vehicle.detections(&search).await? {
            info!(
                "{} at {:?}, {:.0}x{:.0} px",
                detection.name,
                detection.relative_pose.position,
                detection.box2d.size().x,
                detection.box2d.size().y
            );
        }
        thread::sleep(Duration::from_millis(500));
    }

    vehicle.clear_detection(&search).await?;
    client.close();
    Ok(())
}
