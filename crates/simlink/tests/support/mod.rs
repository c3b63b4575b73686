//! A scripted in-process msgpack-RPC server for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_net::{TcpListener, TcpStream};
use bevy::tasks::{Task, TaskPool, TaskPoolBuilder};
use futures_lite::future::block_on;
use futures_lite::{AsyncReadExt, AsyncWriteExt};
use rmpv::Value;
use serde::Serialize;
use simlink::ConnectionSettings;
use simlink::codec::{RpcMessage, decode_frame, to_named_value};

/// How the server answers one request.
pub enum Scripted {
    /// Respond with this result.
    Ok(Value),
    /// Respond with this error object.
    Err(Value),
    /// Close the connection without answering.
    Hangup,
    /// Never answer.
    Silent,
}

impl Scripted {
    /// A result built from any serializable value, records as named maps.
    pub fn ok<T: Serialize>(value: &T) -> Self {
        Scripted::Ok(to_named_value(value).unwrap())
    }
}

type Handler = Arc<dyn Fn(&str, &[Value]) -> Scripted + Send + Sync>;

/// One request as the server received it.
#[derive(Clone, Debug)]
pub struct Call {
    pub method: String,
    pub params: Vec<Value>,
}

pub struct MockServer {
    addr: SocketAddr,
    calls: Arc<Mutex<Vec<Call>>>,
    _accept_task: Task<()>,
    _pool: TaskPool,
}

impl MockServer {
    /// Serve connections one at a time, answering every request with `handler`.
    pub fn start(handler: impl Fn(&str, &[Value]) -> Scripted + Send + Sync + 'static) -> Self {
        let pool = TaskPoolBuilder::new().num_threads(2).build();
        let listener = block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let handler: Handler = Arc::new(handler);
        let recorded = Arc::clone(&calls);
        let accept_task = pool.spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                serve(stream, Arc::clone(&handler), Arc::clone(&recorded)).await;
            }
        });

        Self {
            addr,
            calls,
            _accept_task: accept_task,
            _pool: pool,
        }
    }

    /// Answer `ping` with true and everything else with nil.
    pub fn start_default() -> Self {
        Self::start(|method, _| match method {
            "ping" => Scripted::Ok(Value::Boolean(true)),
            _ => Scripted::Ok(Value::Nil),
        })
    }

    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.addr.ip().to_string(), self.addr.port())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Parameters of the last call to `method`.
    pub fn last_call(&self, method: &str) -> Option<Vec<Value>> {
        self.calls()
            .into_iter()
            .rev()
            .find(|call| call.method == method)
            .map(|call| call.params)
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.method).collect()
    }
}

async fn serve(mut stream: TcpStream, handler: Handler, calls: Arc<Mutex<Vec<Call>>>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        buffer.extend_from_slice(&chunk[..read]);

        while let Some((message, used)) = decode_frame(&buffer).unwrap() {
            buffer.drain(..used);
            let RpcMessage::Request { msgid, method, params } = message else {
                continue;
            };
            calls.lock().unwrap().push(Call {
                method: method.clone(),
                params: params.clone(),
            });

            let (error, result) = match handler(&method, &params) {
                Scripted::Ok(result) => (None, result),
                Scripted::Err(error) => (Some(error), Value::Nil),
                Scripted::Hangup => return,
                Scripted::Silent => continue,
            };
            let response = RpcMessage::Response { msgid, error, result };
            let mut frame = Vec::new();
            rmpv::encode::write_value(&mut frame, &response.to_value()).unwrap();
            if stream.write_all(&frame).await.is_err() {
                return;
            }
        }
    }
}

/// A named-map value from any serializable record.
pub fn named<T: Serialize>(value: &T) -> Value {
    to_named_value(value).unwrap()
}

/// Poll `condition` until it holds, for at most about two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    condition()
}
