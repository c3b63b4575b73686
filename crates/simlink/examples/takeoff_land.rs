//! Take off, fly a square and land again.

use futures_lite::future::block_on;
use simlink::{ConnectionSettings, DrivetrainType, MoveOptions, Multirotor, SimClient, Vector3, Vehicle, YawMode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const ALTITUDE: f64 = -10.0;
const SIDE: f64 = 20.0;
const SPEED: f64 = 5.0;

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
    let mut client = SimClient::multirotor(ConnectionSettings::default());
    client.connect().await?;
    client.confirm_connection().await?;

    let Some(drone) = client.get_vehicles().await?.into_iter().next() else {
        warn!("No multirotor in the simulation");
        return Ok(());
    };

    drone.enable_api_control().await?;
    drone.arm().await?;

    info!("Taking off");
    if !drone.takeoff(Multirotor::TAKEOFF_TIMEOUT).await? {
        warn!("Takeoff timed out");
    }
    drone.move_to_z(ALTITUDE, SPEED, &MoveOptions::default()).await?;

    let options = MoveOptions::default()
        .with_drivetrain(DrivetrainType::ForwardOnly)
        .with_yaw_mode(YawMode::rate(0.0))
        .with_timeout(60.0);
    let square = [
        Vector3::new(SIDE, 0.0, ALTITUDE),
        Vector3::new(SIDE, SIDE, ALTITUDE),
        Vector3::new(0.0, SIDE, ALTITUDE),
        Vector3::new(0.0, 0.0, ALTITUDE),
    ];
    info!("Flying a {} m square", SIDE);
    drone.move_on_path(&square, SPEED, &options).await?;

    let state = drone.state().await?;
    info!(
        "Back at {:?}, landed state {:?}",
        state.kinematics_estimated.position, state.landed_state
    );

    info!("Landing");
    drone.land(Multirotor::LAND_TIMEOUT).await?;
    drone.disarm().await?;
    drone.disable_api_control().await?;

    client.close();
    Ok(())
}
