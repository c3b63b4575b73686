//! Point a vehicle camera at a scene object and save what it sees.
//!
//! `cargo run --example camera_look_at -- <object name> [output.png]`

use futures_lite::future::block_on;
use simlink::{ConnectionSettings, ImageType, SimClient, Vehicle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(object) = args.next() else {
        error!("Usage: camera_look_at <object name> [output.png]");
        std::process::exit(2);
    };
    let output = args.next().unwrap_or_else(|| "look_at.png".to_owned());

    if let Err(err) = block_on(run(&object, &output)) {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(object: &str, output: &str) -> simlink::Result<()> {
    let mut client = SimClient::generic(ConnectionSettings::default());
    client.connect().await?;

    let Some(target) = client.object_pose(object).await? else {
        warn!("No object called {}", object);
        return Ok(());
    };
    let Some(vehicle) = client.get_vehicles().await?.into_iter().next() else {
        warn!("No vehicle in the simulation");
        return Ok(());
    };

    let camera = vehicle.camera("front_center");
    let orientation = camera.look_at(&target.position).await?;
    info!("Camera turned to {:?}", orientation);

    match camera.image(ImageType::Scene).await? {
        Some(png) => {
            if let Err(err) = std::fs::write(output, &png) {
                error!("Could not write {}: {}", output, err);
            } else {
                info!("Saved {} bytes to {}", png.len(), output);
            }
        }
        None => warn!("The camera returned no image"),
    }

    client.close();
    Ok(())
}
