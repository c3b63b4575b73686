//! Drive a car forward for a few seconds, then brake.

use std::thread;
use std::time::Duration;

use futures_lite::future::block_on;
use simlink::{CarControls, ConnectionSettings, SimClient, Vehicle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = block_on(run()) {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> simlink::Result<()> {
    let mut client = SimClient::car(ConnectionSettings::default());
    client.connect().await?;
    client.confirm_connection().await?;

    let Some(car) = client.get_vehicles().await?.into_iter().next() else {
        warn!("No car in the simulation");
        return Ok(());
    };
    car.enable_api_control().await?;

    let mut controls = CarControls {
        throttle: 0.6,
        ..CarControls::default()
    };
    car.set_controls(&controls).await?;
    for _ in 0..5 {
        thread::sleep(Duration::from_secs(1));
        let state = car.state().await?;
        info!("Speed {:.1} m/s in gear {}", state.speed, state.gear);
        if car.collision_info().await?.has_collided {
            warn!("Collided, stopping");
            break;
        }
    }

    controls.throttle = 0.0;
    controls.brake = 1.0;
    car.set_controls(&controls).await?;
    thread::sleep(Duration::from_secs(2));

    car.disable_api_control().await?;
    client.close();
    Ok(())
}
