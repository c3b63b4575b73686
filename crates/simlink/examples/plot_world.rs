//! Draw markers around the world origin for a while.

use futures_lite::future::block_on;
use simlink::{Color, ConnectionSettings, PlotStyle, Pose, SimClient, Vector3};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const SECONDS: f64 = 30.0;

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
    let mut client = SimClient::generic(ConnectionSettings::default());
    client.connect().await?;

    let (min, max) = client.world_extents().await?;
    info!("World spans {:?} to {:?}", min, max);

    let ring: Vec<Vector3> = (0..36)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / 36.0;
            Vector3::new(10.0 * angle.cos(), 10.0 * angle.sin(), -2.0)
        })
        .collect();

    let orange = "orange".parse::<Color>().unwrap_or_default();
    let style = PlotStyle::default().with_color(orange).with_duration(SECONDS);
    client.plot_line_strip(&ring, &style).await?;
    client.plot_points(&ring, &style.with_color([0.0, 0.0, 1.0, 1.0])).await?;

    let origin = Vector3::new(0.0, 0.0, -2.0);
    let tips: Vec<Vector3> = ring.iter().step_by(9).copied().collect();
    let starts = vec![origin; tips.len()];
    client.plot_arrows(&starts, &tips, &style).await?;

    client
        .plot_strings(&["origin".to_owned()], &[origin], 1.0, &style.with_color([1.0, 1.0, 1.0, 1.0]))
        .await?;
    client
        .plot_transforms_with_names(&[Pose::identity()], &["world".to_owned()], 2.0, 1.0, &style)
        .await?;

    info!("Markers stay for {} s", SECONDS);
    client.close();
    Ok(())
}
