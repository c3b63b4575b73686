#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::unwrap_used
)]
#![allow(clippy::type_complexity)]

/*!
An async client for AirSim-style simulators, speaking msgpack-RPC over TCP.

Create a [`SimClient`] for the vehicle type you control, connect it, and ask it
for its vehicles. Every vehicle name maps to exactly one cached instance, and
vehicles only hold a weak reference to the client's [`Session`]: once the
client is closed, calls on a vehicle fail with [`SimError::NoSession`].

Positions and orientations are [`nalgebra`] types in the simulator's NED
frame. [`ned_to_enu`] and friends convert to other frames.

## Example

```rust,no_run
use futures_lite::future::block_on;
use simlink::{ConnectionSettings, Multirotor, SimClient, Vector3, Vehicle};

fn main() -> simlink::Result<()> {
    block_on(async {
        let mut client = SimClient::multirotor(ConnectionSettings::default());
        client.connect().await?;
        client.confirm_connection().await?;

        for drone in client.get_vehicles().await? {
            drone.enable_api_control().await?;
            drone.arm().await?;
            drone.takeoff(Multirotor::TAKEOFF_TIMEOUT).await?;
            drone
                .move_to_position(&Vector3::new(10.0, 0.0, -5.0), 3.0, &Default::default())
                .await?;
            drone.land(Multirotor::LAND_TIMEOUT).await?;
        }

        client.close();
        Ok(())
    })
}
```

Connection I/O runs on a bevy [`TaskPool`](bevy::tasks::TaskPool) owned by the
client. Any executor can drive the returned futures.
*/

/// The top-level client and its vehicle cache.
pub mod client;
/// Contains the [`Runtime`] trait the connection tasks are spawned on.
pub mod runtime;
pub mod session;
/// Settings of the connection to the simulator.
pub mod settings;
mod tcp;
pub mod vehicle;

pub use async_channel;
pub use simlink_common::*;

pub use client::{PlotStyle, SimClient, TimeOfDay, VehicleFactory, VersionInfo};
pub use runtime::{JoinHandle, Runtime};
pub use session::{NO_PARAMS, Session, SessionState};
pub use settings::{ConnectionSettings, DEFAULT_HOST, DEFAULT_PORT};
pub use vehicle::{Camera, Car, GenericVehicle, MoveOptions, Multirotor, SessionRef, Vehicle, VehicleCore};
