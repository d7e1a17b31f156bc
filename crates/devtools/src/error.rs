//! Error types for the DevTools client.
//!
//! Simple, flat error hierarchy. Transport failures on an established
//! channel never reach callers directly; they see `Closed` once teardown
//! completes.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status from the discovery endpoint, as opposed to a
    /// transport-level `Http` failure.
    #[error("unexpected http status {0}")]
    HttpStatus(u16),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// No tab of type "page" was available to attach to.
    #[error("no active tab")]
    NoActiveTab,

    /// The selected tab does not expose a websocket debugger URL.
    #[error("no websocket URL")]
    NoWsUrl,

    /// A command expected a payload in the reply and got none.
    #[error("no response")]
    NoResponse,

    /// The session is closed, or was torn down while the command was in
    /// flight.
    #[error("closed")]
    Closed,

    /// `Page.navigate` reported an `errorText`.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// `Runtime.evaluate` reported a result of subtype "error".
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),
}

/// Details of a failed `Runtime.evaluate`, straight from the peer: the
/// `result` object that carried `subtype == "error"` and the accompanying
/// `exceptionDetails`, if any.
#[derive(Debug, Clone)]
pub struct EvaluateError {
    pub details: Map<String, Value>,
    pub exception_details: Option<Map<String, Value>>,
}

impl fmt::Display for EvaluateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = self
            .details
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("evaluation error");
        write!(f, "{description}")?;

        if let Some(exception) = &self.exception_details {
            if exception.get("exception").is_some() {
                // the peer encodes line/col as floats
                let line = exception
                    .get("lineNumber")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0) as i64;
                let col = exception
                    .get("columnNumber")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0) as i64;
                write!(f, " at line {line} col {col}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for EvaluateError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn evaluate_error_plain() {
        let err = EvaluateError {
            details: object(json!({"description": "ReferenceError: x is not defined"})),
            exception_details: None,
        };
        assert_eq!(err.to_string(), "ReferenceError: x is not defined");
    }

    #[test]
    fn evaluate_error_with_exception_position() {
        let err = EvaluateError {
            details: object(json!({"description": "SyntaxError"})),
            exception_details: Some(object(json!({
                "exception": {"type": "object"},
                "lineNumber": 3.0,
                "columnNumber": 14.0,
            }))),
        };
        assert_eq!(err.to_string(), "SyntaxError at line 3 col 14");
    }

    #[test]
    fn evaluate_error_without_exception_object() {
        let err = EvaluateError {
            details: object(json!({"description": "oops"})),
            exception_details: Some(object(json!({"lineNumber": 1.0}))),
        };
        assert_eq!(err.to_string(), "oops");
    }
}
