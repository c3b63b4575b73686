//! msgpack-RPC over a single TCP stream.
//!
//! One task reads responses and routes them to the waiting callers, the
//! other writes queued request frames. Both share the same [`TcpStream`].

use std::net::Shutdown;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_channel::{Receiver, Sender};
use async_net::TcpStream;
use dashmap::DashMap;
use futures_lite::{AsyncReadExt, AsyncWriteExt};
use rmpv::Value;
use simlink_common::codec::{FrameScanner, RpcMessage, decode_frame};
use simlink_common::error::{Result, SimError};
use tracing::{debug, error, info, trace, warn};

use crate::settings::ConnectionSettings;

/// What a call's reply channel receives: the result, or the server's error object.
pub(crate) type Reply = std::result::Result<Value, Value>;

/// Calls waiting for a response, by msgid.
pub(crate) type PendingCalls = Arc<DashMap<u32, Sender<Reply>>>;

const READ_CHUNK: usize = 64 * 1024;

pub(crate) async fn connect_task(settings: &ConnectionSettings) -> Result<TcpStream> {
    info!("Beginning connection to {}:{}", settings.host, settings.port);
    let stream = TcpStream::connect((settings.host.as_str(), settings.port))
        .await
        .map_err(SimError::Connection)?;

    if let Err(err) = stream.set_nodelay(true) {
        warn!("Could not disable Nagle's algorithm: {}", err);
    }

    match stream.peer_addr() {
        Ok(addr) => debug!("Connected to: {:?}", addr),
        Err(err) => debug!("Connected, peer address unavailable: {}", err),
    }
    Ok(stream)
}

/// Read frames until the stream ends or turns bad.
///
/// When it returns, `alive` is false and every pending call has been dropped,
/// which wakes its caller with a closed channel.
pub(crate) async fn recv_loop(
    mut read_half: TcpStream,
    pending: PendingCalls,
    alive: Arc<AtomicBool>,
    max_frame_length: usize,
) {
    let mut buffer: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = vec![0; READ_CHUNK];
    let mut scanner = FrameScanner::default();

    'read: loop {
        let read = match read_half.read(&mut chunk).await {
            Ok(0) => {
                // EOF, meaning the TCP stream has closed.
                info!("Server closed the connection");
                break;
            }
            Ok(n) => n,
            Err(err) => {
                error!("Encountered error while reading from the server: {}", err);
                break;
            }
        };
        trace!("Read {} bytes", read);
        buffer.extend_from_slice(&chunk[..read]);

        loop {
            let length = match scanner.scan(&buffer) {
                Ok(Some(length)) => length,
                Ok(None) => break,
                Err(err) => {
                    error!("Received malformed data: {}", err);
                    break 'read;
                }
            };
            if length > max_frame_length {
                error!("{}", SimError::FrameTooLarge { size: length, max: max_frame_length });
                break 'read;
            }

            match decode_frame(&buffer[..length]) {
                Ok(Some((message, _))) => dispatch(message, &pending),
                Ok(None) => {
                    error!("Frame of {} bytes ended early", length);
                    break 'read;
                }
                Err(err) => {
                    error!("Failed to decode rpc frame: {}", err);
                    break 'read;
                }
            }
            buffer.drain(..length);
            scanner.reset();
        }

        if buffer.len() > max_frame_length {
            error!("{}", SimError::FrameTooLarge { size: buffer.len(), max: max_frame_length });
            break;
        }
    }

    alive.store(false, Ordering::SeqCst);
    pending.clear();
    if let Err(err) = read_half.shutdown(Shutdown::Both) {
        trace!("Socket already shut down: {}", err);
    }
}

fn dispatch(message: RpcMessage, pending: &PendingCalls) {
    match message {
        RpcMessage::Response { msgid, error, result } => {
            let reply = match error {
                Some(payload) => Err(payload),
                None => Ok(result),
            };
            match pending.remove(&msgid) {
                Some((_, sender)) => {
                    if sender.try_send(reply).is_err() {
                        debug!("Caller of call {} stopped waiting", msgid);
                    }
                }
                None => warn!("Received a response for unknown call {}", msgid),
            }
        }
        RpcMessage::Notification { method, params } => {
            debug!("Ignoring notification `{}` with {} params", method, params.len());
        }
        RpcMessage::Request { msgid, method, .. } => {
            warn!("Ignoring request `{}` ({}) sent by the server", method, msgid);
        }
    }
}

/// Write queued frames until the queue closes or a write fails.
pub(crate) async fn send_loop(mut write_half: TcpStream, frames: Receiver<Vec<u8>>) {
    while let Ok(first_frame) = frames.recv().await {
        // Collect everything queued behind it into a single write
        let mut batch = first_frame;
        let mut batch_size = 1;
        while let Ok(frame) = frames.try_recv() {
            batch.extend_from_slice(&frame);
            batch_size += 1;
        }

        if batch_size > 1 {
            debug!("Batching {} frames into single write", batch_size);
        }
        trace!("Sending {} bytes ({} frames)", batch.len(), batch_size);

        if let Err(err) = write_half.write_all(&batch).await {
            error!("Could not send batch of {} frames: {}", batch_size, err);
            break;
        }
    }

    // Makes the receive loop see EOF if the write side failed first.
    if let Err(err) = write_half.shutdown(Shutdown::Both) {
        trace!("Socket already shut down: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_routes_by_msgid() {
        let pending: PendingCalls = Arc::default();
        let (first_tx, first_rx) = async_channel::bounded(1);
        let (second_tx, second_rx) = async_channel::bounded(1);
        pending.insert(1, first_tx);
        pending.insert(2, second_tx);

        dispatch(
            RpcMessage::Response {
                msgid: 2,
                error: Some(Value::from("boom")),
                result: Value::Nil,
            },
            &pending,
        );
        dispatch(
            RpcMessage::Response {
                msgid: 1,
                error: None,
                result: Value::from(true),
            },
            &pending,
        );
        // Unknown ids are dropped.
        dispatch(
            RpcMessage::Response {
                msgid: 9,
                error: None,
                result: Value::Nil,
            },
            &pending,
        );

        assert!(pending.is_empty());
        assert_eq!(first_rx.try_recv().expect("first"), Ok(Value::from(true)));
        assert_eq!(second_rx.try_recv().expect("second"), Err(Value::from("boom")));
    }
}
