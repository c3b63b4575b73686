mod support;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bevy::tasks::TaskPoolBuilder;
use futures_lite::future::block_on;
use rmpv::Value;
use simlink::{ConnectionSettings, NO_PARAMS, Session, SessionState, SimError};

use support::{MockServer, Scripted, wait_until};

#[test]
fn test_call_before_connect_fails_fast() {
    let session = Session::new(ConnectionSettings::default());
    assert_eq!(session.state(), SessionState::Unconnected);
    assert!(matches!(block_on(session.ping()), Err(SimError::NotConnected)));
}

#[test]
fn test_ping_round_trip() {
    let server = MockServer::start_default();
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());

    block_on(session.connect(&pool)).unwrap();
    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.is_connected());
    assert!(block_on(session.ping()).unwrap());

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "ping");
    assert!(calls[0].params.is_empty());
}

#[test]
fn test_second_connect_keeps_first_connection() {
    let server = MockServer::start_default();
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());

    block_on(session.connect(&pool)).unwrap();
    assert!(matches!(block_on(session.connect(&pool)), Err(SimError::AlreadyConnected)));
    assert_eq!(session.state(), SessionState::Connected);
    assert!(block_on(session.ping()).unwrap());
}

#[test]
fn test_close_is_terminal() {
    let server = MockServer::start_default();
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());
    block_on(session.connect(&pool)).unwrap();

    session.close();
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(block_on(session.ping()), Err(SimError::SessionClosed)));
    assert!(matches!(block_on(session.connect(&pool)), Err(SimError::SessionClosed)));
}

#[test]
fn test_refused_connection_leaves_session_unconnected() {
    // Grab a free port, then stop listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(ConnectionSettings::new("127.0.0.1", port));

    assert!(matches!(block_on(session.connect(&pool)), Err(SimError::Connection(_))));
    assert_eq!(session.state(), SessionState::Unconnected);
}

#[test]
fn test_remote_error_is_passed_through() {
    let server = MockServer::start(|method, _| match method {
        "simGetObjectPose" => Scripted::Err(Value::from("object not found")),
        _ => Scripted::Ok(Value::Nil),
    });
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());
    block_on(session.connect(&pool)).unwrap();

    match block_on(session.sim_get_object_pose("Nope")) {
        Err(SimError::Remote { method, payload }) => {
            assert_eq!(method, "simGetObjectPose");
            assert_eq!(payload, Value::from("object not found"));
        }
        other => panic!("expected a remote error, got {:?}", other),
    }
    // The connection survives a failed call.
    assert!(block_on(session.sim_list_assets()).is_err());
    assert!(session.is_connected());
}

#[test]
fn test_server_hangup_fails_outstanding_and_later_calls() {
    let server = MockServer::start(|method, _| match method {
        "reset" => Scripted::Hangup,
        _ => Scripted::Ok(Value::Boolean(true)),
    });
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());
    block_on(session.connect(&pool)).unwrap();

    assert!(matches!(block_on(session.reset()), Err(SimError::ConnectionClosed)));
    assert!(wait_until(|| !session.is_connected()));
    assert!(matches!(block_on(session.ping()), Err(SimError::ConnectionClosed)));
    assert_eq!(session.state(), SessionState::Connected);

    session.close();
    assert!(matches!(block_on(session.ping()), Err(SimError::SessionClosed)));
}

#[test]
fn test_close_resolves_call_in_flight() {
    let server = MockServer::start(|method, _| match method {
        "hover" => Scripted::Silent,
        _ => Scripted::Ok(Value::Nil),
    });
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Arc::new(Session::new(server.settings()));
    block_on(session.connect(&pool)).unwrap();

    let closer = {
        let session = Arc::clone(&session);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            session.close();
        })
    };
    assert!(matches!(block_on(session.hover("")), Err(SimError::SessionClosed)));
    closer.join().unwrap();
}

#[test]
fn test_records_travel_as_named_maps() {
    let server = MockServer::start_default();
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());
    block_on(session.connect(&pool)).unwrap();

    let wind = simlink::wire::Vector3r {
        x_val: 1.0,
        y_val: 2.0,
        z_val: -3.0,
    };
    block_on(session.sim_set_wind(wind)).unwrap();
    let params = server.last_call("simSetWind").unwrap();
    assert_eq!(params[0]["x_val"].as_f64(), Some(1.0));
    assert_eq!(params[0]["z_val"].as_f64(), Some(-3.0));

    block_on(session.sim_set_weather_parameter(simlink::WeatherParameter::Fog, 0.25)).unwrap();
    let params = server.last_call("simSetWeatherParameter").unwrap();
    assert_eq!(params[0].as_i64(), Some(7));
    assert_eq!(params[1].as_f64(), Some(0.25));
}

#[test]
fn test_raw_call() {
    let server = MockServer::start(|method, params| match method {
        "echo" => Scripted::Ok(Value::Array(params.to_vec())),
        _ => Scripted::Ok(Value::Nil),
    });
    let pool = TaskPoolBuilder::new().num_threads(2).build();
    let session = Session::new(server.settings());
    block_on(session.connect(&pool)).unwrap();

    let echoed = block_on(session.call_raw("echo", vec![Value::from(1), Value::from("two")])).unwrap();
    assert_eq!(echoed, Value::Array(vec![Value::from(1), Value::from("two")]));

    let () = block_on(session.call::<_, ()>("reset", NO_PARAMS)).unwrap();
    assert_eq!(server.methods(), ["echo", "reset"]);
}
