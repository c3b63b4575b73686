//! The top-level client: one session plus a cache of typed vehicles.
//!
//! A [`SimClient`] is generic over one vehicle type. Every name the
//! simulator lists becomes exactly one `Arc<V>`, built by the client's
//! factory, and looking the same name up again hands back that same `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bevy::tasks::{TaskPool, TaskPoolBuilder};
use simlink_common::color::{Color, color_to_rgba};
use simlink_common::convert::{to_pose, to_pose_wire, to_vector3, to_vector3_wire};
use simlink_common::error::{Result, SimError};
use simlink_common::geometry::{GeoPoint, Pose, Vector3};
use simlink_common::types::{LogSeverity, WeatherParameter};
use simlink_common::wire;
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::settings::ConnectionSettings;
use crate::vehicle::{Camera, Car, GenericVehicle, Multirotor, SessionRef, Vehicle, VehicleCore};

/// Protocol version this client speaks.
pub const CLIENT_VERSION: i32 = 1;

/// Oldest server protocol version this client works with.
pub const MIN_REQUIRED_SERVER_VERSION: i32 = 1;

/// Builds a vehicle of the client's type from its identity.
pub type VehicleFactory<V> = Box<dyn Fn(VehicleCore) -> V + Send + Sync>;

/// Versions exchanged by [`SimClient::confirm_connection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    /// Protocol version of this client.
    pub client_version: i32,
    /// Protocol version reported by the server.
    pub server_version: i32,
    /// Oldest client version the server accepts.
    pub min_required_client_version: i32,
    /// Oldest server version this client accepts.
    pub min_required_server_version: i32,
}

impl VersionInfo {
    /// Whether the server is new enough for this client.
    pub fn server_ok(&self) -> bool {
        self.server_version >= self.min_required_server_version
    }

    /// Whether this client is new enough for the server.
    pub fn client_ok(&self) -> bool {
        self.client_version >= self.min_required_client_version
    }

    /// Both sides accept each other.
    pub fn is_compatible(&self) -> bool {
        self.server_ok() && self.client_ok()
    }
}

/// Appearance of plotted markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotStyle {
    /// Marker color.
    pub color: Color,
    /// Point size.
    pub size: f64,
    /// Line thickness.
    pub thickness: f64,
    /// Arrow head size.
    pub arrow_size: f64,
    /// Seconds the markers stay; negative for one frame.
    pub duration: f64,
    /// Keep the markers until [`SimClient::flush_persistent_markers`].
    pub is_persistent: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            size: 10.0,
            thickness: 5.0,
            arrow_size: 2.0,
            duration: -1.0,
            is_persistent: false,
        }
    }
}

impl PlotStyle {
    /// Draw in `color`.
    pub fn with_color(mut self, color: impl Into<Color>) -> Self {
        self.color = color.into();
        self
    }

    /// Keep the markers for `duration` seconds.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Keep the markers until flushed.
    pub fn persistent(mut self) -> Self {
        self.is_persistent = true;
        self
    }

    fn rgba(&self) -> [f64; 4] {
        color_to_rgba(&self.color, 1.0)
    }
}

/// Sun position control for [`SimClient::set_time_of_day`].
#[derive(Clone, Debug, PartialEq)]
pub struct TimeOfDay {
    /// Simulate the time of day at all.
    pub enabled: bool,
    /// `%Y-%m-%d %H:%M:%S`, or empty for now.
    pub start_datetime: String,
    /// Whether `start_datetime` is daylight saving time.
    pub is_start_datetime_dst: bool,
    /// Celestial clock speed relative to the simulation clock.
    pub clock_speed: f64,
    /// Seconds between sun position updates.
    pub update_interval_secs: f64,
    /// Move the sun, not only the sky.
    pub move_sun: bool,
}

impl Default for TimeOfDay {
    fn default() -> Self {
        Self {
            enabled: true,
            start_datetime: String::new(),
            is_start_datetime_dst: false,
            clock_speed: 1.0,
            update_interval_secs: 60.0,
            move_sun: true,
        }
    }
}

/// Client of one simulator, managing vehicles of type `V`.
pub struct SimClient<V: Vehicle> {
    settings: ConnectionSettings,
    runtime: TaskPool,
    session: Option<Arc<Session>>,
    factory: VehicleFactory<V>,
    vehicles: HashMap<String, Arc<V>>,
}

impl SimClient<Car> {
    /// A client for cars.
    pub fn car(settings: ConnectionSettings) -> Self {
        Self::new(settings, Car::from_core)
    }
}

impl SimClient<Multirotor> {
    /// A client for multirotors.
    pub fn multirotor(settings: ConnectionSettings) -> Self {
        Self::new(settings, Multirotor::from_core)
    }
}

impl SimClient<GenericVehicle> {
    /// A client treating every vehicle as a [`GenericVehicle`].
    pub fn generic(settings: ConnectionSettings) -> Self {
        Self::new(settings, GenericVehicle::from_core)
    }
}

impl<V: Vehicle> SimClient<V> {
    /// A client building its vehicles with `factory`. Nothing connects
    /// until [`SimClient::connect`].
    pub fn new<F>(settings: ConnectionSettings, factory: F) -> Self
    where
        F: Fn(VehicleCore) -> V + Send + Sync + 'static,
    {
        Self::with_runtime(settings, factory, TaskPoolBuilder::new().num_threads(2).build())
    }

    /// Like [`SimClient::new`], running connection I/O on `runtime`.
    pub fn with_runtime<F>(settings: ConnectionSettings, factory: F, runtime: TaskPool) -> Self
    where
        F: Fn(VehicleCore) -> V + Send + Sync + 'static,
    {
        Self {
            settings,
            runtime,
            session: None,
            factory: Box::new(factory),
            vehicles: HashMap::new(),
        }
    }

    /// Connection settings.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Connect to the simulator with a fresh session.
    ///
    /// The previous session and the vehicle cache are only replaced once the
    /// new session is connected. On failure the client is left as it was.
    pub async fn connect(&mut self) -> Result<()> {
        let session = Arc::new(Session::new(self.settings.clone()));
        session.connect(&self.runtime).await?;
        self.close();
        self.session = Some(session);
        Ok(())
    }

    /// Close and drop the session and forget every cached vehicle. Vehicles
    /// still held elsewhere fail with [`SimError::NoSession`] from now on.
    pub fn close(&mut self) {
        self.vehicles.clear();
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    /// Whether a session exists.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// The session, or [`SimError::NoSession`] before [`SimClient::connect`].
    pub fn session(&self) -> Result<Arc<Session>> {
        self.session.clone().ok_or(SimError::NoSession)
    }

    /// A non-owning handle to the session; detached without one.
    pub fn session_ref(&self) -> SessionRef {
        self.session
            .as_ref()
            .map(SessionRef::new)
            .unwrap_or_else(SessionRef::detached)
    }

    /// Ping the server and check protocol versions in both directions.
    ///
    /// A mismatch is logged and reported, not returned as an error.
    pub async fn confirm_connection(&self) -> Result<VersionInfo> {
        let session = self.session()?;
        if session.ping().await? {
            info!("Connected to simulator at {}:{}", self.settings.host, self.settings.port);
        }

        let versions = VersionInfo {
            client_version: CLIENT_VERSION,
            server_version: session.get_server_version().await?,
            min_required_client_version: session.get_min_required_client_version().await?,
            min_required_server_version: MIN_REQUIRED_SERVER_VERSION,
        };
        if !versions.server_ok() {
            warn!(
                "Simulator server version {} is older than the required {}; update the simulator",
                versions.server_version, versions.min_required_server_version
            );
        }
        if !versions.client_ok() {
            warn!(
                "Client version {} is older than the {} the server requires; update the client",
                versions.client_version, versions.min_required_client_version
            );
        }
        Ok(versions)
    }

    /// Whether the server answers.
    pub async fn ping(&self) -> Result<bool> {
        self.session()?.ping().await
    }

    /// Reset every vehicle to its initial state.
    pub async fn reset(&self) -> Result<()> {
        self.session()?.reset().await
    }

    /// The simulator's settings document.
    pub async fn get_settings(&self) -> Result<serde_json::Value> {
        let text = self.session()?.get_settings_string().await?;
        serde_json::from_str(&text).map_err(|err| SimError::Decode(format!("settings document: {}", err)))
    }

    /// Print `message` and `param` in the simulator window.
    pub async fn print_log_message(&self, message: &str, param: &str, severity: LogSeverity) -> Result<()> {
        self.session()?.sim_print_log_message(message, param, severity).await
    }

    /// Pause or resume the simulation.
    pub async fn pause(&self, pause: bool) -> Result<()> {
        self.session()?.sim_pause(pause).await
    }

    /// Whether the simulation is paused.
    pub async fn is_paused(&self) -> Result<bool> {
        self.session()?.sim_is_paused().await
    }

    /// Run a paused simulation for `seconds`, then pause again.
    pub async fn continue_for_time(&self, seconds: f64) -> Result<()> {
        self.session()?.sim_continue_for_time(seconds).await
    }

    /// Run a paused simulation for `frames` frames, then pause again.
    pub async fn continue_for_frames(&self, frames: u32) -> Result<()> {
        self.session()?.sim_continue_for_frames(frames).await
    }

    /// Turn weather effects on or off.
    pub async fn enable_weather(&self, enable: bool) -> Result<()> {
        self.session()?.sim_enable_weather(enable).await
    }

    /// Set one weather effect, `value` in `[0, 1]`.
    pub async fn set_weather_parameter(&self, param: WeatherParameter, value: f64) -> Result<()> {
        self.session()?.sim_set_weather_parameter(param, value).await
    }

    /// Set the wind, in m/s in the world NED frame.
    pub async fn set_wind(&self, wind: &Vector3) -> Result<()> {
        self.session()?.sim_set_wind(to_vector3_wire(wind)).await
    }

    /// Control the sun position.
    pub async fn set_time_of_day(&self, time_of_day: &TimeOfDay) -> Result<()> {
        self.session()?
            .sim_set_time_of_day(
                time_of_day.enabled,
                &time_of_day.start_datetime,
                time_of_day.is_start_datetime_dst,
                time_of_day.clock_speed,
                time_of_day.update_interval_secs,
                time_of_day.move_sun,
            )
            .await
    }

    /// Minimum and maximum corners of the world.
    pub async fn world_extents(&self) -> Result<(Vector3, Vector3)> {
        let [min, max] = self.session()?.sim_get_world_extents().await?;
        Ok((to_vector3(&min), to_vector3(&max)))
    }

    /// Set the intensity of a light. Returns whether the light exists.
    pub async fn set_light_intensity(&self, light_name: &str, intensity: f64) -> Result<bool> {
        self.session()?.sim_set_light_intensity(light_name, intensity).await
    }

    /// Run an Unreal console command.
    pub async fn run_console_command(&self, command: &str) -> Result<bool> {
        self.session()?.sim_run_console_command(command).await
    }

    /// Names of the scene objects matching `name_regex`.
    pub async fn list_scene_objects(&self, name_regex: &str) -> Result<Vec<String>> {
        self.session()?.sim_list_scene_objects(name_regex).await
    }

    /// Names of the assets that can be spawned.
    pub async fn list_assets(&self) -> Result<Vec<String>> {
        self.session()?.sim_list_assets().await
    }

    /// Spawn `asset_name` at `pose` and return the name the object got.
    pub async fn spawn_object(
        &self,
        object_name: &str,
        asset_name: &str,
        pose: &Pose,
        scale: &Vector3,
        physics_enabled: bool,
        is_blueprint: bool,
    ) -> Result<String> {
        let name = self
            .session()?
            .sim_spawn_object(
                object_name,
                asset_name,
                to_pose_wire(pose),
                to_vector3_wire(scale),
                physics_enabled,
                is_blueprint,
            )
            .await?;
        debug!("Spawned {} as {}", asset_name, name);
        Ok(name)
    }

    /// Remove an object from the scene.
    pub async fn destroy_object(&self, object_name: &str) -> Result<bool> {
        self.session()?.sim_destroy_object(object_name).await
    }

    /// Pose of a scene object; `None` when no object has that name.
    pub async fn object_pose(&self, object_name: &str) -> Result<Option<Pose>> {
        let pose = to_pose(&self.session()?.sim_get_object_pose(object_name).await?);
        Ok((!pose.has_nan()).then_some(pose))
    }

    /// Move a scene object. Without `teleport` it is swept and may collide.
    pub async fn set_object_pose(&self, object_name: &str, pose: &Pose, teleport: bool) -> Result<bool> {
        self.session()?
            .sim_set_object_pose(object_name, to_pose_wire(pose), teleport)
            .await
    }

    /// Scale of a scene object.
    pub async fn object_scale(&self, object_name: &str) -> Result<Vector3> {
        Ok(to_vector3(&self.session()?.sim_get_object_scale(object_name).await?))
    }

    /// Rescale a scene object.
    pub async fn set_object_scale(&self, object_name: &str, scale: &Vector3) -> Result<bool> {
        self.session()?
            .sim_set_object_scale(object_name, to_vector3_wire(scale))
            .await
    }

    /// Whether nothing blocks the line between two geo points.
    pub async fn test_line_of_sight_between_points(&self, point1: GeoPoint, point2: GeoPoint) -> Result<bool> {
        self.session()?
            .sim_test_line_of_sight_between_points(point1, point2)
            .await
    }

    /// A camera placed in the world rather than on a vehicle.
    pub fn external_camera(&self, name: &str) -> Result<Camera> {
        let session = self.session()?;
        Ok(Camera::new(name.into(), String::new(), true, SessionRef::new(&session)))
    }

    /// Remove every persistent marker.
    pub async fn flush_persistent_markers(&self) -> Result<()> {
        self.session()?.sim_flush_persistent_markers().await
    }

    /// Plot points in the world NED frame.
    pub async fn plot_points(&self, points: &[Vector3], style: &PlotStyle) -> Result<()> {
        self.session()?
            .sim_plot_points(&wire_points(points), style.rgba(), style.size, style.duration, style.is_persistent)
            .await
    }

    /// Plot a line through consecutive points.
    pub async fn plot_line_strip(&self, points: &[Vector3], style: &PlotStyle) -> Result<()> {
        self.session()?
            .sim_plot_line_strip(&wire_points(points), style.rgba(), style.thickness, style.duration, style.is_persistent)
            .await
    }

    /// Plot one line per pair of points.
    pub async fn plot_line_list(&self, points: &[Vector3], style: &PlotStyle) -> Result<()> {
        self.session()?
            .sim_plot_line_list(&wire_points(points), style.rgba(), style.thickness, style.duration, style.is_persistent)
            .await
    }

    /// Plot an arrow from each start point to the end point at the same index.
    pub async fn plot_arrows(&self, starts: &[Vector3], ends: &[Vector3], style: &PlotStyle) -> Result<()> {
        self.session()?
            .sim_plot_arrows(
                &wire_points(starts),
                &wire_points(ends),
                style.rgba(),
                style.thickness,
                style.arrow_size,
                style.duration,
                style.is_persistent,
            )
            .await
    }

    /// Plot each string at the position with the same index. Text markers
    /// are never persistent.
    pub async fn plot_strings(
        &self,
        strings: &[String],
        positions: &[Vector3],
        scale: f64,
        style: &PlotStyle,
    ) -> Result<()> {
        self.session()?
            .sim_plot_strings(strings, &wire_points(positions), scale, style.rgba(), style.duration)
            .await
    }

    /// Plot coordinate axes at each pose.
    pub async fn plot_transforms(&self, poses: &[Pose], scale: f64, style: &PlotStyle) -> Result<()> {
        self.session()?
            .sim_plot_transforms(&wire_poses(poses), scale, style.thickness, style.duration, style.is_persistent)
            .await
    }

    /// Plot coordinate axes at each pose, labelled with the name at the same index.
    pub async fn plot_transforms_with_names(
        &self,
        poses: &[Pose],
        names: &[String],
        scale: f64,
        text_scale: f64,
        style: &PlotStyle,
    ) -> Result<()> {
        self.session()?
            .sim_plot_transforms_with_names(
                &wire_poses(poses),
                names,
                scale,
                style.thickness,
                text_scale,
                style.rgba(),
                style.duration,
            )
            .await
    }

    /// Every vehicle the simulator lists, one cached instance per name.
    ///
    /// Vehicles the simulator no longer lists are dropped from the cache.
    pub async fn get_vehicles(&mut self) -> Result<Vec<Arc<V>>> {
        let session = self.session()?;
        let names = session.list_vehicles().await?;
        let session_ref = SessionRef::new(&session);

        self.vehicles.retain(|name, _| {
            let listed = names.contains(name);
            if !listed {
                debug!("Vehicle {} is gone", name);
            }
            listed
        });

        let mut vehicles = Vec::with_capacity(names.len());
        for name in names {
            let vehicle = self.vehicles.entry(name).or_insert_with_key(|name| {
                debug!("Found vehicle {}", name);
                Arc::new((self.factory)(VehicleCore::new(name.clone(), session_ref.clone())))
            });
            vehicles.push(Arc::clone(vehicle));
        }
        Ok(vehicles)
    }

    /// The vehicle called `name`, after refreshing the list from the simulator.
    pub async fn get_vehicle(&mut self, name: &str) -> Result<Option<Arc<V>>> {
        self.get_vehicles().await?;
        Ok(self.cached_vehicle(name))
    }

    /// The cached vehicle called `name`, without asking the simulator.
    pub fn cached_vehicle(&self, name: &str) -> Option<Arc<V>> {
        self.vehicles.get(name).cloned()
    }

    /// Spawn a vehicle at `pose` and cache it. An empty `vehicle_type`
    /// picks the default of `V`.
    ///
    /// Returns `None` when the simulator refused.
    pub async fn add_vehicle(
        &mut self,
        name: &str,
        vehicle_type: &str,
        pawn_path: &str,
        pose: &Pose,
    ) -> Result<Option<Arc<V>>> {
        let session = self.session()?;
        let core = VehicleCore::new(name, SessionRef::new(&session))
            .with_type(vehicle_type)
            .with_pawn_path(pawn_path);
        let vehicle = (self.factory)(core);

        let added = session
            .sim_add_vehicle(vehicle.name(), vehicle.vehicle_type(), to_pose_wire(pose), vehicle.pawn_path())
            .await?;
        if !added {
            warn!("Simulator refused to add vehicle {} of type {}", name, vehicle.vehicle_type());
            return Ok(None);
        }

        info!("Added vehicle {} of type {}", name, vehicle.vehicle_type());
        let vehicle = Arc::new(vehicle);
        self.vehicles.insert(name.to_owned(), Arc::clone(&vehicle));
        Ok(Some(vehicle))
    }
}

impl<V: Vehicle> fmt::Debug for SimClient<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimClient")
            .field("settings", &self.settings)
            .field("session", &self.session)
            .field("vehicles", &self.vehicles.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn wire_points(points: &[Vector3]) -> Vec<wire::Vector3r> {
    points.iter().map(to_vector3_wire).collect()
}

fn wire_poses(poses: &[Pose]) -> Vec<wire::Pose> {
    poses.iter().map(to_pose_wire).collect()
}
