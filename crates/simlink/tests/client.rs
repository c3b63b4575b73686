mod support;

use std::sync::Arc;

use futures_lite::future::block_on;
use rmpv::Value;
use simlink::wire;
use simlink::{
    CameraPoseUpdate, Car, ConnectionSettings, DetectionSearch, DrivetrainType, GenericVehicle, Multirotor, PlotStyle,
    Pose, Quaternion, SessionRef, SimClient, SimError, Vector3, Vehicle, YawMode,
};

use support::{MockServer, Scripted};

const TOLERANCE: f64 = 1e-9;

fn wire_pose(x: f64, y: f64, z: f64) -> wire::Pose {
    wire::Pose {
        position: wire::Vector3r {
            x_val: x,
            y_val: y,
            z_val: z,
        },
        orientation: wire::Quaternionr::default(),
    }
}

fn fleet_server(names: &'static [&'static str]) -> MockServer {
    MockServer::start(move |method, _| match method {
        "ping" => Scripted::Ok(Value::Boolean(true)),
        "listVehicles" => Scripted::ok(&names),
        "simGetVehiclePose" => Scripted::ok(&wire_pose(1.0, 2.0, 3.0)),
        _ => Scripted::Ok(Value::Nil),
    })
}

#[test]
fn test_vehicle_call_without_session() {
    let client = SimClient::car(ConnectionSettings::default());
    assert!(matches!(block_on(client.ping()), Err(SimError::NoSession)));

    let car = Car::new("Car1", client.session_ref());
    assert!(matches!(block_on(car.pose()), Err(SimError::NoSession)));
    assert!(matches!(block_on(car.state()), Err(SimError::NoSession)));
}

#[test]
fn test_connect_failure_keeps_no_session() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = SimClient::generic(ConnectionSettings::new("127.0.0.1", port));
    assert!(matches!(block_on(client.connect()), Err(SimError::Connection(_))));
    assert!(!client.has_session());
}

#[test]
fn test_failed_reconnect_keeps_live_session() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let mut client = SimClient::generic(ConnectionSettings::new("127.0.0.1", port));
    block_on(client.connect()).unwrap();
    let (_stream, _) = listener.accept().unwrap();
    let live = client.session().unwrap();

    // Nothing listens on the port any more.
    drop(listener);
    assert!(matches!(block_on(client.connect()), Err(SimError::Connection(_))));

    assert!(client.has_session());
    let kept = client.session().unwrap();
    assert!(Arc::ptr_eq(&live, &kept));
    assert!(kept.is_connected());
}

#[test]
fn test_vehicle_cache_identity() {
    let server = fleet_server(&["Car1", "Car2"]);
    let mut client = SimClient::car(server.settings());
    block_on(client.connect()).unwrap();

    let first = block_on(client.get_vehicles()).unwrap();
    let second = block_on(client.get_vehicles()).unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().zip(&second).all(|(a, b)| Arc::ptr_eq(a, b)));

    let car1 = block_on(client.get_vehicle("Car1")).unwrap().unwrap();
    assert!(Arc::ptr_eq(&car1, &first[0]));
    assert_eq!(car1.name(), "Car1");
    assert_eq!(car1.vehicle_type(), "PhysXCar");
    assert!(car1.core().session.ptr_eq(&client.session_ref()));

    assert!(block_on(client.get_vehicle("Car3")).unwrap().is_none());
}

#[test]
fn test_vehicle_pose_is_converted() {
    let server = fleet_server(&["Drone1"]);
    let mut client = SimClient::multirotor(server.settings());
    block_on(client.connect()).unwrap();

    let drone = block_on(client.get_vehicle("Drone1")).unwrap().unwrap();
    let pose = block_on(drone.pose()).unwrap();
    assert!((pose.position - Vector3::new(1.0, 2.0, 3.0)).norm() < TOLERANCE);
    assert_eq!(pose.orientation, Quaternion::identity());
    assert_eq!(server.last_call("simGetVehiclePose").unwrap(), [Value::from("Drone1")]);
}

#[test]
fn test_vehicles_outlived_by_closed_client() {
    let server = fleet_server(&["Car1"]);
    let mut client = SimClient::car(server.settings());
    block_on(client.connect()).unwrap();
    let car = block_on(client.get_vehicle("Car1")).unwrap().unwrap();

    client.close();
    assert!(!client.has_session());
    assert!(client.cached_vehicle("Car1").is_none());
    assert!(matches!(block_on(car.pose()), Err(SimError::NoSession)));

    // Reconnecting builds new vehicles on the new session.
    block_on(client.connect()).unwrap();
    let again = block_on(client.get_vehicle("Car1")).unwrap().unwrap();
    assert!(!Arc::ptr_eq(&car, &again));
    assert!(block_on(again.pose()).is_ok());
}

#[test]
fn test_confirm_connection_reports_versions() {
    let server = MockServer::start(|method, _| match method {
        "ping" => Scripted::Ok(Value::Boolean(true)),
        "getServerVersion" => Scripted::Ok(Value::from(1)),
        "getMinRequiredClientVersion" => Scripted::Ok(Value::from(2)),
        _ => Scripted::Ok(Value::Nil),
    });
    let mut client = SimClient::generic(server.settings());
    block_on(client.connect()).unwrap();

    let versions = block_on(client.confirm_connection()).unwrap();
    assert_eq!(versions.server_version, 1);
    assert_eq!(versions.min_required_client_version, 2);
    assert!(versions.server_ok());
    assert!(!versions.client_ok());
    assert_eq!(server.methods(), ["ping", "getServerVersion", "getMinRequiredClientVersion"]);
}

#[test]
fn test_camera_orientation_update_keeps_position() {
    let server = fleet_server(&["Car1"]);
    let mut client = SimClient::car(server.settings());
    block_on(client.connect()).unwrap();
    let car = block_on(client.get_vehicle("Car1")).unwrap().unwrap();

    let camera = car.camera("front_center");
    let q = Quaternion::new(0.0, 0.0, 0.0, 1.0);
    block_on(camera.set_pose(CameraPoseUpdate::orientation(q))).unwrap();

    let params = server.last_call("simSetCameraPose").unwrap();
    assert_eq!(params[0], Value::from("front_center"));
    assert!(params[1]["position"]["x_val"].as_f64().unwrap().is_nan());
    assert!(params[1]["position"]["z_val"].as_f64().unwrap().is_nan());
    assert_eq!(params[1]["orientation"]["z_val"].as_f64(), Some(1.0));
    assert_eq!(params[2], Value::from("Car1"));
    assert_eq!(params[3], Value::Boolean(false));
}

#[test]
fn test_external_camera_look_at() {
    let server = MockServer::start(|method, _| match method {
        "simGetCameraInfo" => Scripted::ok(&wire::CameraInfo {
            pose: wire_pose(0.0, 0.0, 0.0),
            fov: 90.0,
            proj_mat: wire::ProjectionMatrix::default(),
        }),
        _ => Scripted::Ok(Value::Nil),
    });
    let mut client = SimClient::generic(server.settings());
    block_on(client.connect()).unwrap();

    let camera = client.external_camera("spectator").unwrap();
    let q = block_on(camera.look_at(&Vector3::new(0.0, 5.0, 0.0))).unwrap();
    // A quarter turn to the right about the down axis.
    let half = std::f64::consts::FRAC_PI_4;
    assert!((q.w - half.cos()).abs() < TOLERANCE);
    assert!((q.k - half.sin()).abs() < TOLERANCE);

    let params = server.last_call("simSetCameraPose").unwrap();
    assert_eq!(params[0], Value::from("spectator"));
    assert!(params[1]["position"]["x_val"].as_f64().unwrap().is_nan());
    assert_eq!(params[2], Value::from(""));
    assert_eq!(params[3], Value::Boolean(true));
    assert!(!server.methods().contains(&"simGetVehiclePose".to_owned()));
}

#[test]
fn test_detection_search_lifecycle() {
    let server = MockServer::start(|method, _| match method {
        "simGetDetections" => Scripted::ok(&vec![wire::DetectionInfo {
            name: "Cylinder_3".to_owned(),
            ..Default::default()
        }]),
        _ => Scripted::Ok(Value::Nil),
    });
    let vehicle = {
        let mut client = SimClient::generic(server.settings());
        block_on(client.connect()).unwrap();
        let vehicle = GenericVehicle::new("", client.session_ref());
        let search = DetectionSearch::new("front_center", "Cylinder*").with_radius_cm(200.0);

        block_on(vehicle.start_detection(&search)).unwrap();
        let detections = block_on(vehicle.detections(&search)).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].name, "Cylinder_3");
        block_on(vehicle.clear_detection(&search)).unwrap();

        let radius = server.last_call("simSetDetectionFilterRadius").unwrap();
        assert_eq!(radius[2].as_f64(), Some(200.0));
        let mesh = server.last_call("simAddDetectionFilterMeshName").unwrap();
        assert_eq!(mesh[2], Value::from("Cylinder*"));
        vehicle
    };
    assert_eq!(
        server.methods(),
        [
            "simSetDetectionFilterRadius",
            "simAddDetectionFilterMeshName",
            "simGetDetections",
            "simClearDetectionMeshNames",
        ]
    );
    // The client is gone, and with it the session.
    assert!(matches!(block_on(vehicle.detections(&DetectionSearch::new(0u32, "*"))), Err(SimError::NoSession)));
}

#[test]
fn test_multirotor_task_parameters() {
    let server = MockServer::start(|method, _| match method {
        "moveToPosition" | "takeoff" => Scripted::Ok(Value::Boolean(true)),
        _ => Scripted::Ok(Value::Nil),
    });
    let client = {
        let mut client = SimClient::multirotor(server.settings());
        block_on(client.connect()).unwrap();
        client
    };
    let drone = Multirotor::new("Drone1", client.session_ref());

    assert!(block_on(drone.takeoff(Multirotor::TAKEOFF_TIMEOUT)).unwrap());
    assert_eq!(
        server.last_call("takeoff").unwrap(),
        [Value::from(20.0), Value::from("Drone1")]
    );

    let options = Default::default();
    assert!(block_on(drone.move_to_position(&Vector3::new(10.0, 0.0, -5.0), 3.0, &options)).unwrap());
    let params = server.last_call("moveToPosition").unwrap();
    assert_eq!(params.len(), 10);
    assert_eq!(params[2].as_f64(), Some(-5.0));
    assert_eq!(params[3].as_f64(), Some(3.0));
    assert_eq!(params[5].as_i64(), Some(i64::from(i32::from(DrivetrainType::MaxDegreeOfFreedom))));
    assert_eq!(params[6]["is_rate"], Value::Boolean(true));
    assert_eq!(params[6]["yaw_or_rate"].as_f64(), Some(0.0));
    assert_eq!(params[7].as_f64(), Some(-1.0));
    assert_eq!(params[9], Value::from("Drone1"));

    let path = [Vector3::new(0.0, 0.0, -5.0), Vector3::new(5.0, 5.0, -5.0)];
    let options = simlink::MoveOptions::default().with_yaw_mode(YawMode::angle(90.0));
    assert!(block_on(drone.move_on_path(&path, 2.0, &options)).is_err());
    let params = server.last_call("moveOnPath").unwrap();
    assert_eq!(params[0][1]["x_val"].as_f64(), Some(5.0));
    assert_eq!(params[4]["is_rate"], Value::Boolean(false));
}

#[test]
fn test_world_operations_convert_geometry() {
    let server = MockServer::start(|method, params| match method {
        "simGetObjectPose" if params[0] == Value::from("Missing") => {
            Scripted::ok(&wire_pose(f64::NAN, f64::NAN, f64::NAN))
        }
        "simGetObjectPose" => Scripted::ok(&wire_pose(4.0, 5.0, 6.0)),
        "simGetWorldExtents" => Scripted::ok(&[wire_pose(-1.0, -2.0, -3.0).position, wire_pose(1.0, 2.0, 3.0).position]),
        "getSettingsString" => Scripted::Ok(Value::from(r#"{"SimMode": "Multirotor", "ClockSpeed": 1.0}"#)),
        "simSpawnObject" => Scripted::Ok(Value::from("Cube_2")),
        _ => Scripted::Ok(Value::Nil),
    });
    let mut client = SimClient::generic(server.settings());
    block_on(client.connect()).unwrap();

    let pose = block_on(client.object_pose("Cube")).unwrap().unwrap();
    assert!((pose.position - Vector3::new(4.0, 5.0, 6.0)).norm() < TOLERANCE);
    assert!(block_on(client.object_pose("Missing")).unwrap().is_none());

    let (min, max) = block_on(client.world_extents()).unwrap();
    assert_eq!(min, Vector3::new(-1.0, -2.0, -3.0));
    assert_eq!(max, Vector3::new(1.0, 2.0, 3.0));

    let settings = block_on(client.get_settings()).unwrap();
    assert_eq!(settings["SimMode"], "Multirotor");

    let name = block_on(client.spawn_object(
        "Cube",
        "Cube",
        &Pose::from_position(Vector3::new(1.0, 0.0, 0.0)),
        &Vector3::new(1.0, 1.0, 1.0),
        false,
        false,
    ))
    .unwrap();
    assert_eq!(name, "Cube_2");

    let style = PlotStyle::default().with_color("green".parse::<simlink::Color>().unwrap());
    block_on(client.plot_points(&[Vector3::new(0.0, 0.0, -1.0)], &style)).unwrap();
    let params = server.last_call("simPlotPoints").unwrap();
    assert_eq!(params[0][0]["z_val"].as_f64(), Some(-1.0));
    let rgba: Vec<f64> = params[1].as_array().unwrap().iter().map(|c| c.as_f64().unwrap()).collect();
    assert!((rgba[1] - 128.0 / 255.0).abs() < TOLERANCE);
    assert_eq!(rgba[3], 1.0);
    assert_eq!(params[2].as_f64(), Some(10.0));
    assert_eq!(params[4], Value::Boolean(false));
}

#[test]
fn test_add_vehicle_caches_on_success() {
    let server = MockServer::start(|method, params| match method {
        "simAddVehicle" => Scripted::Ok(Value::Boolean(params[0] != Value::from("Taken"))),
        "listVehicles" => Scripted::ok(&["Car1", "Car9"]),
        _ => Scripted::Ok(Value::Nil),
    });
    let mut client = SimClient::car(server.settings());
    block_on(client.connect()).unwrap();

    let added = block_on(client.add_vehicle("Car9", "", "", &Pose::identity()))
        .unwrap()
        .unwrap();
    let params = server.last_call("simAddVehicle").unwrap();
    assert_eq!(params[0], Value::from("Car9"));
    assert_eq!(params[1], Value::from("PhysXCar"));
    assert_eq!(params[3], Value::from(""));

    let listed = block_on(client.get_vehicle("Car9")).unwrap().unwrap();
    assert!(Arc::ptr_eq(&added, &listed));

    assert!(block_on(client.add_vehicle("Taken", "", "", &Pose::identity())).unwrap().is_none());
    assert!(client.cached_vehicle("Taken").is_none());
}

#[test]
fn test_detached_vehicle_ref() {
    let vehicle = GenericVehicle::new("anything", SessionRef::detached());
    assert!(matches!(block_on(vehicle.home()), Err(SimError::NoSession)));
    assert!(matches!(block_on(vehicle.camera("front_center").info()), Err(SimError::NoSession)));
    assert_eq!(vehicle.cameras().len(), GenericVehicle::DEFAULT_CAMERA_NAMES.len());
}
