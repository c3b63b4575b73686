use simlink_common::error::Result;
use simlink_common::types::CarControls;
use simlink_common::wire::CarState;

use super::Session;

impl Session {
    /// Speed, gear and estimated kinematics of a car.
    pub async fn get_car_state(&self, vehicle_name: &str) -> Result<CarState> {
        self.call("getCarState", (vehicle_name,)).await
    }

    /// The controls last applied to a car.
    pub async fn get_car_controls(&self, vehicle_name: &str) -> Result<CarControls> {
        self.call("getCarControls", (vehicle_name,)).await
    }

    /// Apply throttle, steering, brake and gear to a car.
    pub async fn set_car_controls(&self, controls: CarControls, vehicle_name: &str) -> Result<()> {
        self.call("setCarControls", (controls, vehicle_name)).await
    }
}
