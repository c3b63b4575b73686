//! The connection to the simulator and the raw remote operations.
//!
//! A [`Session`] owns one TCP connection and exposes one async method per
//! remote operation. Arguments and results are wire records from
//! [`simlink_common::wire`]; converting them to geometry types happens in the
//! vehicle and client layer, never here.
//!
//! ## States
//!
//! ```text
//! Unconnected --connect()--> Connecting --ok--> Connected --close()--> Closed
//!      ^                         |
//!      +---------- err ----------+
//! ```
//!
//! Remote calls need `Connected`. Before that they fail with
//! [`SimError::NotConnected`], after [`Session::close`] with
//! [`SimError::SessionClosed`]. If the server goes away, outstanding and
//! later calls fail with [`SimError::ConnectionClosed`].

mod car;
mod multirotor;
mod simulation;
mod vehicle;

use std::fmt;
use std::net::Shutdown;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_channel::Sender;
use async_net::TcpStream;
use serde::Serialize;
use serde::de::DeserializeOwned;
use simlink_common::codec::encode_request;
use simlink_common::error::{Result, SimError};
use tracing::{debug, info, trace};

use crate::runtime::{JoinHandle, Runtime, run_async};
use crate::settings::ConnectionSettings;
use crate::tcp::{self, PendingCalls};

/// Parameters of a remote operation that takes none.
pub const NO_PARAMS: [(); 0] = [];

/// Where a [`Session`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, `connect()` not called yet or the last attempt failed.
    Unconnected,
    /// A `connect()` is in flight.
    Connecting,
    /// Remote calls can be made.
    Connected,
    /// `close()` was called. Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unconnected => "unconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

enum Link {
    Unconnected,
    Connecting,
    Connected(Connection),
    Closed,
}

impl Link {
    fn state(&self) -> SessionState {
        match self {
            Link::Unconnected => SessionState::Unconnected,
            Link::Connecting => SessionState::Connecting,
            Link::Connected(_) => SessionState::Connected,
            Link::Closed => SessionState::Closed,
        }
    }
}

struct Connection {
    stream: TcpStream,
    outgoing: Sender<Vec<u8>>,
    pending: PendingCalls,
    alive: Arc<AtomicBool>,
    receive_task: Box<dyn JoinHandle>,
    send_task: Box<dyn JoinHandle>,
}

impl Connection {
    fn start<RT: Runtime>(stream: TcpStream, settings: &ConnectionSettings, runtime: &RT) -> Self {
        let (outgoing, frames) = async_channel::bounded(settings.channel_capacity.max(1));
        let pending = PendingCalls::default();
        let alive = Arc::new(AtomicBool::new(true));

        let receive_task = Box::new(run_async(
            tcp::recv_loop(
                stream.clone(),
                Arc::clone(&pending),
                Arc::clone(&alive),
                settings.max_frame_length,
            ),
            runtime,
        ));
        let send_task = Box::new(run_async(tcp::send_loop(stream.clone(), frames), runtime));

        Self {
            stream,
            outgoing,
            pending,
            alive,
            receive_task,
            send_task,
        }
    }

    fn stop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        self.receive_task.abort();
        self.send_task.abort();
        self.outgoing.close();
        if let Err(err) = self.stream.shutdown(Shutdown::Both) {
            trace!("Socket already shut down: {}", err);
        }
        self.pending.clear();
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Puts the session back to `Unconnected` if `connect()` does not finish,
/// whether it failed or its future was dropped.
struct ConnectingGuard<'a>(&'a Session);

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        let mut link = self.0.link();
        if matches!(*link, Link::Connecting) {
            *link = Link::Unconnected;
        }
    }
}

/// One connection to the simulator.
pub struct Session {
    settings: ConnectionSettings,
    link: Mutex<Link>,
    next_msgid: AtomicU32,
}

impl Session {
    /// A session for the simulator described by `settings`. Nothing is
    /// opened until [`Session::connect`].
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            link: Mutex::new(Link::Unconnected),
            next_msgid: AtomicU32::new(0),
        }
    }

    /// The settings this session connects with.
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.link().state()
    }

    /// Whether remote calls can be made right now.
    pub fn is_connected(&self) -> bool {
        match &*self.link() {
            Link::Connected(connection) => connection.alive.load(Ordering::SeqCst),
            _ => false,
        }
    }

    /// Open the TCP connection and start its I/O tasks on `runtime`.
    ///
    /// Fails with [`SimError::AlreadyConnected`] while connecting or connected,
    /// leaving that connection alone, and with [`SimError::SessionClosed`]
    /// once closed. A failed attempt leaves the session `Unconnected`.
    pub async fn connect<RT: Runtime>(&self, runtime: &RT) -> Result<()> {
        {
            let mut link = self.link();
            match *link {
                Link::Unconnected => *link = Link::Connecting,
                Link::Connecting | Link::Connected(_) => return Err(SimError::AlreadyConnected),
                Link::Closed => return Err(SimError::SessionClosed),
            }
        }
        let _guard = ConnectingGuard(self);

        let stream = tcp::connect_task(&self.settings).await?;

        let mut link = self.link();
        if !matches!(*link, Link::Connecting) {
            // Closed while the connection was being opened.
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                trace!("Socket already shut down: {}", err);
            }
            return Err(SimError::SessionClosed);
        }
        *link = Link::Connected(Connection::start(stream, &self.settings, runtime));
        info!("Connected to {}:{}", self.settings.host, self.settings.port);
        Ok(())
    }

    /// Close the connection. Outstanding calls fail with
    /// [`SimError::SessionClosed`]; so does everything after. Idempotent.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.link(), Link::Closed);
        if let Link::Connected(connection) = previous {
            drop(connection);
            info!("Session closed");
        }
    }

    /// Call `method` with positional `params` and decode its result.
    ///
    /// `params` must serialize to a sequence, usually a tuple; pass
    /// [`NO_PARAMS`] for none. Void methods decode into `()`.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let (outgoing, pending, alive) = {
            match &*self.link() {
                Link::Connected(connection) => (
                    connection.outgoing.clone(),
                    Arc::clone(&connection.pending),
                    Arc::clone(&connection.alive),
                ),
                Link::Closed => return Err(SimError::SessionClosed),
                Link::Unconnected | Link::Connecting => return Err(SimError::NotConnected),
            }
        };

        let msgid = self.next_msgid.fetch_add(1, Ordering::Relaxed);
        let frame = encode_request(msgid, method, &params)?;
        drop(params);

        let (reply_sender, replies) = async_channel::bounded(1);
        pending.insert(msgid, reply_sender);
        // The receive loop marks the connection dead before it drops pending
        // calls, so a call registered after that is caught here.
        if !alive.load(Ordering::SeqCst) {
            pending.remove(&msgid);
            return Err(SimError::ConnectionClosed);
        }

        trace!("Calling `{}` ({}), {} bytes", method, msgid, frame.len());
        if outgoing.send(frame).await.is_err() {
            pending.remove(&msgid);
            return Err(self.disconnected());
        }

        let Ok(reply) = replies.recv().await else {
            return Err(self.disconnected());
        };
        match reply {
            Ok(value) => rmpv::ext::from_value(value)
                .map_err(|err| SimError::Decode(format!("result of `{}`: {}", method, err))),
            Err(payload) => {
                debug!("`{}` failed on the server: {}", method, payload);
                Err(SimError::Remote {
                    method: method.to_owned(),
                    payload,
                })
            }
        }
    }

    fn disconnected(&self) -> SimError {
        match self.state() {
            SessionState::Closed => SimError::SessionClosed,
            _ => SimError::ConnectionClosed,
        }
    }

    fn link(&self) -> MutexGuard<'_, Link> {
        self.link.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("host", &self.settings.host)
            .field("port", &self.settings.port)
            .field("state", &self.state())
            .finish()
    }
}
