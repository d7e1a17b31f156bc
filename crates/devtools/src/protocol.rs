//! Wire types for the debugging channel.
//!
//! Keep them minimal: one outbound envelope, one inbound envelope, and an
//! untyped map view for payloads. `result` and `params` stay as raw bytes
//! until a consumer asks for a typed view, because result shapes are
//! command-specific and event params are only worth parsing when a callback
//! is registered.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;

/// Request id, unique and strictly increasing within a session.
pub type RequestId = u64;

/// Outbound command envelope, written as a single text frame.
#[derive(Debug, Serialize)]
pub struct Command {
    pub id: RequestId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Inbound frame: either a reply (`id` + `result`) or an event (`method` +
/// `params`). The discriminator is a non-empty `method`.
#[derive(Debug, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub result: Option<Box<RawValue>>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Box<RawValue>>,
}

impl Frame {
    pub fn is_event(&self) -> bool {
        self.method.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Untyped payload view handed to event callbacks and returned by
/// `send_request`.
///
/// The peer encodes every number as a float, so the integer accessor
/// round-trips through `f64` even for logical integers like `nodeId` or
/// `status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(pub Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_f64).map(|v| v as i64)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }
}

impl Deref for Params {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Params {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Decode a reply payload into the untyped map view.
pub(crate) fn unmarshal(payload: &[u8]) -> Result<Params> {
    serde_json::from_slice(payload).map_err(|err| {
        warn!(
            "unmarshal {}: {err}",
            String::from_utf8_lossy(payload)
        );
        err.into()
    })
}

/// Accept a float where the schema means an integer.
pub(crate) fn float_as_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(|v| v as i64)
}

pub(crate) fn float_seq_as_i64<'de, D>(deserializer: D) -> std::result::Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<f64>::deserialize(deserializer).map(|v| v.into_iter().map(|x| x as i64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn frame_discrimination() {
        let reply: Frame = serde_json::from_str(r#"{"id":7,"result":{"frameId":"F"}}"#).unwrap();
        assert!(!reply.is_event());
        assert_eq!(reply.id, Some(7));
        assert!(reply.result.is_some());

        let event: Frame =
            serde_json::from_str(r#"{"method":"Page.loadEventFired","params":{}}"#).unwrap();
        assert!(event.is_event());
        assert_eq!(event.id, None);

        // an empty method is not an event
        let odd: Frame = serde_json::from_str(r#"{"id":1,"method":""}"#).unwrap();
        assert!(!odd.is_event());
    }

    #[test]
    fn command_skips_missing_params() {
        let command = Command {
            id: 1,
            method: "Page.enable".into(),
            params: None,
        };
        assert_eq!(
            serde_json::to_string(&command).unwrap(),
            r#"{"id":1,"method":"Page.enable"}"#
        );
    }

    #[test]
    fn params_coerce_floats_to_int() {
        let params: Params =
            serde_json::from_value(json!({"nodeId": 42.0, "status": 200, "name": "n"})).unwrap();
        assert_eq!(params.int("nodeId"), Some(42));
        assert_eq!(params.int("status"), Some(200));
        assert_eq!(params.int("missing"), None);
        assert_eq!(params.string("name"), Some("n"));
    }

    #[test]
    fn unmarshal_rejects_garbage() {
        assert!(unmarshal(b"not json").is_err());
        assert!(unmarshal(br#"{"ok":true}"#).is_ok());
    }
}
