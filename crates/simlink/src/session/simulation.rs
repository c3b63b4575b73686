//! Simulation-wide operations: lifecycle, clock, environment, scene objects
//! and debug plotting.

use rmpv::Value;
use simlink_common::error::Result;
use simlink_common::types::{LogSeverity, WeatherParameter};
use simlink_common::wire::{Pose, Vector3r};
use simlink_common::{GeoPoint, Rgba};

use super::{NO_PARAMS, Session};

impl Session {
    /// Check that the server answers.
    pub async fn ping(&self) -> Result<bool> {
        self.call("ping", NO_PARAMS).await
    }

    /// Reset the simulation to its initial state.
    pub async fn reset(&self) -> Result<()> {
        self.call("reset", NO_PARAMS).await
    }

    /// API version of the server.
    pub async fn get_server_version(&self) -> Result<i32> {
        self.call("getServerVersion", NO_PARAMS).await
    }

    /// Oldest client API version the server accepts.
    pub async fn get_min_required_client_version(&self) -> Result<i32> {
        self.call("getMinRequiredClientVersion", NO_PARAMS).await
    }

    /// The settings document the simulator was started with, as JSON text.
    pub async fn get_settings_string(&self) -> Result<String> {
        self.call("getSettingsString", NO_PARAMS).await
    }

    /// Print `message` and `param` in the simulator window. Repeated messages
    /// replace each other instead of stacking.
    pub async fn sim_print_log_message(&self, message: &str, param: &str, severity: LogSeverity) -> Result<()> {
        self.call("simPrintLogMessage", (message, param, severity)).await
    }

    /// Pause or resume the simulation clock.
    pub async fn sim_pause(&self, pause: bool) -> Result<()> {
        self.call("simPause", (pause,)).await
    }

    /// Whether the simulation clock is paused.
    pub async fn sim_is_paused(&self) -> Result<bool> {
        self.call("simIsPaused", NO_PARAMS).await
    }

    /// Run a paused simulation for `seconds`, then pause again.
    pub async fn sim_continue_for_time(&self, seconds: f64) -> Result<()> {
        self.call("simContinueForTime", (seconds,)).await
    }

    /// Run a paused simulation for `frames` frames, then pause again.
    pub async fn sim_continue_for_frames(&self, frames: u32) -> Result<()> {
        self.call("simContinueForFrames", (frames,)).await
    }

    /// Turn weather effects on or off.
    pub async fn sim_enable_weather(&self, enable: bool) -> Result<()> {
        self.call("simEnableWeather", (enable,)).await
    }

    /// Set the intensity of one weather effect, 0 to 1.
    pub async fn sim_set_weather_parameter(&self, param: WeatherParameter, value: f64) -> Result<()> {
        self.call("simSetWeatherParameter", (param, value)).await
    }

    /// Set the wind, in m/s in the world NED frame.
    pub async fn sim_set_wind(&self, wind: Vector3r) -> Result<()> {
        self.call("simSetWind", (wind,)).await
    }

    /// Control the sun position.
    ///
    /// `start_datetime` is `%Y-%m-%d %H:%M:%S`, or empty for now.
    /// `clock_speed` scales the celestial clock against the simulation clock.
    pub async fn sim_set_time_of_day(
        &self,
        enabled: bool,
        start_datetime: &str,
        is_start_datetime_dst: bool,
        clock_speed: f64,
        update_interval_secs: f64,
        move_sun: bool,
    ) -> Result<()> {
        self.call(
            "simSetTimeOfDay",
            (
                enabled,
                start_datetime,
                is_start_datetime_dst,
                clock_speed,
                update_interval_secs,
                move_sun,
            ),
        )
        .await
    }

    /// Minimum and maximum corners of the world.
    pub async fn sim_get_world_extents(&self) -> Result<[Vector3r; 2]> {
        self.call("simGetWorldExtents", NO_PARAMS).await
    }

    /// Change the intensity of a named light.
    pub async fn sim_set_light_intensity(&self, light_name: &str, intensity: f64) -> Result<bool> {
        self.call("simSetLightIntensity", (light_name, intensity)).await
    }

    /// Run an Unreal console command.
    pub async fn sim_run_console_command(&self, command: &str) -> Result<bool> {
        self.call("simRunConsoleCommand", (command,)).await
    }

    /// Names of the scene objects matching `name_regex`.
    pub async fn sim_list_scene_objects(&self, name_regex: &str) -> Result<Vec<String>> {
        self.call("simListSceneObjects", (name_regex,)).await
    }

    /// Assets that can be spawned.
    pub async fn sim_list_assets(&self) -> Result<Vec<String>> {
        self.call("simListAssets", NO_PARAMS).await
    }

    /// Spawn `asset_name` as a new object. Returns the name it got, which
    /// differs from `object_name` when that was taken.
    pub async fn sim_spawn_object(
        &self,
        object_name: &str,
        asset_name: &str,
        pose: Pose,
        scale: Vector3r,
        physics_enabled: bool,
        is_blueprint: bool,
    ) -> Result<String> {
        self.call(
            "simSpawnObject",
            (object_name, asset_name, pose, scale, physics_enabled, is_blueprint),
        )
        .await
    }

    /// Remove an object from the scene.
    pub async fn sim_destroy_object(&self, object_name: &str) -> Result<bool> {
        self.call("simDestroyObject", (object_name,)).await
    }

    /// Pose of an object in the world frame. Every component is NaN when
    /// the object does not exist.
    pub async fn sim_get_object_pose(&self, object_name: &str) -> Result<Pose> {
        self.call("simGetObjectPose", (object_name,)).await
    }

    /// Move an object. With `teleport` it jumps there without affecting its
    /// velocity.
    pub async fn sim_set_object_pose(&self, object_name: &str, pose: Pose, teleport: bool) -> Result<bool> {
        self.call("simSetObjectPose", (object_name, pose, teleport)).await
    }

    /// Scale of an object.
    pub async fn sim_get_object_scale(&self, object_name: &str) -> Result<Vector3r> {
        self.call("simGetObjectScale", (object_name,)).await
    }

    /// Rescale an object.
    pub async fn sim_set_object_scale(&self, object_name: &str, scale: Vector3r) -> Result<bool> {
        self.call("simSetObjectScale", (object_name, scale)).await
    }

    /// Whether the straight line between two geo points is unobstructed.
    pub async fn sim_test_line_of_sight_between_points(&self, point1: GeoPoint, point2: GeoPoint) -> Result<bool> {
        self.call("simTestLineOfSightBetweenPoints", (point1, point2)).await
    }

    /// Remove every marker plotted with `is_persistent`.
    pub async fn sim_flush_persistent_markers(&self) -> Result<()> {
        self.call("simFlushPersistentMarkers", NO_PARAMS).await
    }

    /// Plot points in the world NED frame. A negative `duration` plots them
    /// for one frame.
    pub async fn sim_plot_points(
        &self,
        points: &[Vector3r],
        color_rgba: Rgba,
        size: f64,
        duration: f64,
        is_persistent: bool,
    ) -> Result<()> {
        self.call("simPlotPoints", (points, color_rgba, size, duration, is_persistent))
            .await
    }

    /// Plot a line through consecutive points.
    pub async fn sim_plot_line_strip(
        &self,
        points: &[Vector3r],
        color_rgba: Rgba,
        thickness: f64,
        duration: f64,
        is_persistent: bool,
    ) -> Result<()> {
        self.call(
            "simPlotLineStrip",
            (points, color_rgba, thickness, duration, is_persistent),
        )
        .await
    }

    /// Plot one line per pair of points; `points` must have an even length.
    pub async fn sim_plot_line_list(
        &self,
        points: &[Vector3r],
        color_rgba: Rgba,
        thickness: f64,
        duration: f64,
        is_persistent: bool,
    ) -> Result<()> {
        self.call(
            "simPlotLineList",
            (points, color_rgba, thickness, duration, is_persistent),
        )
        .await
    }

    /// Plot an arrow from each start point to the end point at the same index.
    #[allow(clippy::too_many_arguments)]
    pub async fn sim_plot_arrows(
        &self,
        points_start: &[Vector3r],
        points_end: &[Vector3r],
        color_rgba: Rgba,
        thickness: f64,
        arrow_size: f64,
        duration: f64,
        is_persistent: bool,
    ) -> Result<()> {
        self.call(
            "simPlotArrows",
            (
                points_start,
                points_end,
                color_rgba,
                thickness,
                arrow_size,
                duration,
                is_persistent,
            ),
        )
        .await
    }

    /// Plot each string at the position with the same index.
    pub async fn sim_plot_strings(
        &self,
        strings: &[String],
        positions: &[Vector3r],
        scale: f64,
        color_rgba: Rgba,
        duration: f64,
    ) -> Result<()> {
        self.call("simPlotStrings", (strings, positions, scale, color_rgba, duration))
            .await
    }

    /// Plot coordinate axes at each pose.
    pub async fn sim_plot_transforms(
        &self,
        poses: &[Pose],
        scale: f64,
        thickness: f64,
        duration: f64,
        is_persistent: bool,
    ) -> Result<()> {
        self.call(
            "simPlotTransforms",
            (poses, scale, thickness, duration, is_persistent),
        )
        .await
    }

    /// Plot coordinate axes at each pose, labelled with the name at the same index.
    #[allow(clippy::too_many_arguments)]
    pub async fn sim_plot_transforms_with_names(
        &self,
        poses: &[Pose],
        names: &[String],
        tf_scale: f64,
        tf_thickness: f64,
        text_scale: f64,
        text_color_rgba: Rgba,
        duration: f64,
    ) -> Result<()> {
        self.call(
            "simPlotTransformsWithNames",
            (
                poses,
                names,
                tf_scale,
                tf_thickness,
                text_scale,
                text_color_rgba,
                duration,
            ),
        )
        .await
    }

    /// Names of the vehicles in the simulation.
    pub async fn list_vehicles(&self) -> Result<Vec<String>> {
        self.call("listVehicles", NO_PARAMS).await
    }

    /// Create a vehicle at runtime. An empty `pawn_path` uses the default
    /// blueprint for `vehicle_type`.
    pub async fn sim_add_vehicle(&self, vehicle_name: &str, vehicle_type: &str, pose: Pose, pawn_path: &str) -> Result<bool> {
        self.call("simAddVehicle", (vehicle_name, vehicle_type, pose, pawn_path))
            .await
    }

    /// Any remote operation not wrapped here, with an untyped result.
    pub async fn call_raw(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.call(method, params).await
    }
}
