use std::io::{self, Cursor};

use codee::{Decoder, Encoder};
use rmpv::Value;
use serde::Serialize;

use crate::error::{Result, SimError};

/// Message type tag of a request.
pub const REQUEST: u8 = 0;
/// Message type tag of a response.
pub const RESPONSE: u8 = 1;
/// Message type tag of a notification.
pub const NOTIFICATION: u8 = 2;

/// One msgpack-RPC message.
#[derive(Clone, Debug, PartialEq)]
pub enum RpcMessage {
    /// `[0, msgid, method, params]`
    Request {
        /// Correlation id.
        msgid: u32,
        /// Remote method name.
        method: String,
        /// Positional parameters.
        params: Vec<Value>,
    },
    /// `[1, msgid, error, result]`
    Response {
        /// Id of the request this answers.
        msgid: u32,
        /// Error object; `None` when the wire carried nil.
        error: Option<Value>,
        /// Return value; nil for void methods.
        result: Value,
    },
    /// `[2, method, params]`
    Notification {
        /// Method name.
        method: String,
        /// Positional parameters.
        params: Vec<Value>,
    },
}

impl RpcMessage {
    /// Interpret a decoded msgpack value as an RPC message.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Array(mut fields) = value else {
            return Err(SimError::MalformedFrame(format!("expected an array, got {}", value)));
        };
        let kind = fields.first().and_then(Value::as_u64);

        match (kind, fields.len()) {
            (Some(k), 4) if k == u64::from(REQUEST) => {
                let params = take_params(fields.pop())?;
                let method = take_method(fields.pop())?;
                let msgid = take_msgid(&fields[1])?;
                Ok(RpcMessage::Request { msgid, method, params })
            }
            (Some(k), 4) if k == u64::from(RESPONSE) => {
                let result = fields.pop().unwrap_or(Value::Nil);
                let error = fields.pop().filter(|e| !e.is_nil());
                let msgid = take_msgid(&fields[1])?;
                Ok(RpcMessage::Response { msgid, error, result })
            }
            (Some(k), 3) if k == u64::from(NOTIFICATION) => {
                let params = take_params(fields.pop())?;
                let method = take_method(fields.pop())?;
                Ok(RpcMessage::Notification { method, params })
            }
            _ => Err(SimError::MalformedFrame(format!(
                "unrecognized message header {:?} with {} fields",
                kind,
                fields.len()
            ))),
        }
    }

    /// The message as a msgpack value.
    pub fn to_value(&self) -> Value {
        match self {
            RpcMessage::Request { msgid, method, params } => Value::Array(vec![
                Value::from(REQUEST),
                Value::from(*msgid),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
            RpcMessage::Response { msgid, error, result } => Value::Array(vec![
                Value::from(RESPONSE),
                Value::from(*msgid),
                error.clone().unwrap_or(Value::Nil),
                result.clone(),
            ]),
            RpcMessage::Notification { method, params } => Value::Array(vec![
                Value::from(NOTIFICATION),
                Value::from(method.as_str()),
                Value::Array(params.clone()),
            ]),
        }
    }
}

fn take_msgid(value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| SimError::MalformedFrame(format!("invalid msgid {}", value)))
}

fn take_method(value: Option<Value>) -> Result<String> {
    match value {
        Some(Value::String(s)) => s
            .into_str()
            .ok_or_else(|| SimError::MalformedFrame("method name is not utf-8".into())),
        other => Err(SimError::MalformedFrame(format!("invalid method name {:?}", other))),
    }
}

fn take_params(value: Option<Value>) -> Result<Vec<Value>> {
    match value {
        Some(Value::Array(params)) => Ok(params),
        other => Err(SimError::MalformedFrame(format!("params must be an array, got {:?}", other))),
    }
}

/// Encode a request with typed parameters.
///
/// `params` must serialize to a sequence: a tuple, array or `Vec`. Records
/// inside are encoded as maps keyed by field name, which is what the server
/// matches on.
pub fn encode_request<P: Serialize + ?Sized>(msgid: u32, method: &str, params: &P) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(&(REQUEST, msgid, method, params))?)
}

/// Serialize any value to a msgpack [`Value`], encoding records as maps.
pub fn to_named_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let bytes = rmp_serde::to_vec_named(value)?;
    rmpv::decode::read_value(&mut bytes.as_slice())
        .map_err(|err| SimError::Encode(err.to_string()))
}

/// Decode the first complete message buffered in `buf`.
///
/// Returns the message and the number of bytes it occupied, or `None` when
/// `buf` holds only part of a message.
pub fn decode_frame(buf: &[u8]) -> Result<Option<(RpcMessage, usize)>> {
    if buf.is_empty() {
        return Ok(None);
    }
    let mut cursor = Cursor::new(buf);
    match rmpv::decode::read_value(&mut cursor) {
        Ok(value) => {
            // Bounded by buf.len(), which is a usize.
            let used = cursor.position() as usize;
            RpcMessage::from_value(value).map(|message| Some((message, used)))
        }
        Err(err) if is_incomplete(&err) => Ok(None),
        Err(err) => Err(SimError::MalformedFrame(err.to_string())),
    }
}

fn is_incomplete(err: &rmpv::decode::Error) -> bool {
    match err {
        rmpv::decode::Error::InvalidMarkerRead(io) | rmpv::decode::Error::InvalidDataRead(io) => {
            io.kind() == io::ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

/// Codec for complete msgpack-RPC frames.
///
/// Messages are self-delimiting msgpack values, so no length prefix is
/// written. A streaming reader should use [`decode_frame`], which tolerates
/// partially received data.
///
/// ## Usage
///
/// ```rust
/// use codee::{Decoder, Encoder};
/// use simlink_common::codec::{MsgpackRpcCodec, RpcMessage};
///
/// let message = RpcMessage::Request { msgid: 7, method: "ping".into(), params: vec![] };
/// let bytes = MsgpackRpcCodec::encode(&message).unwrap();
/// assert_eq!(MsgpackRpcCodec::decode(&bytes).unwrap(), message);
/// ```
pub struct MsgpackRpcCodec;

impl Encoder<RpcMessage> for MsgpackRpcCodec {
    type Error = SimError;
    type Encoded = Vec<u8>;

    fn encode(val: &RpcMessage) -> Result<Self::Encoded, Self::Error> {
        let mut buffer = Vec::new();
        rmpv::encode::write_value(&mut buffer, &val.to_value())
            .map_err(|err| SimError::Encode(err.to_string()))?;
        Ok(buffer)
    }
}

impl Decoder<RpcMessage> for MsgpackRpcCodec {
    type Error = SimError;
    type Encoded = [u8];

    fn decode(val: &Self::Encoded) -> Result<RpcMessage, Self::Error> {
        match decode_frame(val)? {
            Some((message, used)) if used == val.len() => Ok(message),
            Some((_, used)) => Err(SimError::MalformedFrame(format!(
                "{} trailing bytes after message",
                val.len() - used
            ))),
            None => Err(SimError::MalformedFrame("incomplete message".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Vector3r;

    #[test]
    fn test_request_layout() {
        let wind = Vector3r {
            x_val: 1.0,
            y_val: 0.0,
            z_val: -2.0,
        };
        let bytes = encode_request(3, "simSetWind", &(wind,)).expect("encode");
        let Some((RpcMessage::Request { msgid, method, params }, used)) = decode_frame(&bytes).expect("decode") else {
            panic!("expected a request");
        };
        assert_eq!(used, bytes.len());
        assert_eq!(msgid, 3);
        assert_eq!(method, "simSetWind");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0]["z_val"].as_f64(), Some(-2.0));
    }

    #[test]
    fn test_no_params_is_an_empty_array() {
        let bytes = encode_request(0, "ping", &[(); 0]).expect("encode");
        let message = MsgpackRpcCodec::decode(&bytes).expect("decode");
        assert_eq!(
            message,
            RpcMessage::Request {
                msgid: 0,
                method: "ping".into(),
                params: vec![]
            }
        );
    }

    #[test]
    fn test_partial_frames_wait_for_more() {
        let message = RpcMessage::Response {
            msgid: 9,
            error: None,
            result: Value::from("ok"),
        };
        let bytes = MsgpackRpcCodec::encode(&message).expect("encode");
        for cut in 0..bytes.len() {
            assert!(decode_frame(&bytes[..cut]).expect("partial").is_none());
        }

        let mut two = bytes.clone();
        two.extend_from_slice(&bytes);
        let (first, used) = decode_frame(&two).expect("decode").expect("complete");
        assert_eq!(first, message);
        assert_eq!(used, bytes.len());
        assert!(MsgpackRpcCodec::decode(&two).is_err());
    }

    #[test]
    fn test_response_error_payload() {
        let bytes = rmp_serde::to_vec(&(RESPONSE, 4u32, "vehicle not found", ())).expect("encode");
        let message = MsgpackRpcCodec::decode(&bytes).expect("decode");
        assert_eq!(
            message,
            RpcMessage::Response {
                msgid: 4,
                error: Some(Value::from("vehicle not found")),
                result: Value::Nil
            }
        );
    }

    #[test]
    fn test_malformed_messages() {
        let bytes = rmp_serde::to_vec(&(7u8, 1u32)).expect("encode");
        assert!(matches!(decode_frame(&bytes), Err(SimError::MalformedFrame(_))));

        let bytes = rmp_serde::to_vec(&"hello").expect("encode");
        assert!(matches!(decode_frame(&bytes), Err(SimError::MalformedFrame(_))));
    }

    #[test]
    fn test_notification() {
        let message = RpcMessage::Notification {
            method: "tick".into(),
            params: vec![Value::from(1)],
        };
        let bytes = MsgpackRpcCodec::encode(&message).expect("encode");
        assert_eq!(MsgpackRpcCodec::decode(&bytes).expect("decode"), message);
    }
}
