use simlink_common::convert::WireConversion;
use simlink_common::error::Result;
use simlink_common::state::CarState;
use simlink_common::types::CarControls;

use super::{SessionRef, Vehicle, VehicleCore};

/// A ground vehicle driven through throttle, steering, brake and gear.
#[derive(Clone, Debug)]
pub struct Car {
    core: VehicleCore,
}

impl Car {
    /// Vehicle type used when none is given.
    pub const DEFAULT_TYPE: &'static str = "PhysXCar";

    /// Cameras the simulator puts on a car.
    pub const DEFAULT_CAMERA_NAMES: &'static [&'static str] =
        &["front_center", "front_right", "front_left", "fpv", "back_center"];

    /// A car named `name` reached through `session`.
    pub fn new(name: impl Into<String>, session: SessionRef) -> Self {
        Self::from_core(VehicleCore::new(name, session))
    }

    /// Wrap an existing identity, defaulting the type to [`Car::DEFAULT_TYPE`].
    pub fn from_core(core: VehicleCore) -> Self {
        Self {
            core: core.or_type(Self::DEFAULT_TYPE),
        }
    }

    /// Speed, gear and estimated kinematics.
    pub async fn state(&self) -> Result<CarState> {
        let state = self.session()?.get_car_state(self.name()).await?;
        Ok(CarState::from_wire(&state))
    }

    /// The controls last applied.
    pub async fn controls(&self) -> Result<CarControls> {
        self.session()?.get_car_controls(self.name()).await
    }

    /// Apply throttle, steering, brake and gear. API control must be enabled.
    pub async fn set_controls(&self, controls: &CarControls) -> Result<()> {
        self.session()?.set_car_controls(*controls, self.name()).await
    }
}

impl Vehicle for Car {
    fn core(&self) -> &VehicleCore {
        &self.core
    }

    fn default_camera_names(&self) -> &'static [&'static str] {
        Self::DEFAULT_CAMERA_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_type() {
        let car = Car::new("Car1", SessionRef::detached());
        assert_eq!(car.vehicle_type(), "PhysXCar");
        assert_eq!(car.pawn_path(), "");
        assert_eq!(car.cameras().len(), 5);
    }
}
