//! Input domain: synthetic keyboard and mouse events.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::merge;
use crate::error::Result;
use crate::session::RemoteDebugger;

/// Key modifier bits for mouse events: combine with `|`.
pub const MODIFIER_NONE: i64 = 0;
pub const MODIFIER_ALT: i64 = 1;
pub const MODIFIER_CTRL: i64 = 2;
pub const MODIFIER_META: i64 = 4;
pub const MODIFIER_COMMAND: i64 = 4;
pub const MODIFIER_SHIFT: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MouseEventKind {
    #[serde(rename = "mouseMoved")]
    Moved,
    #[serde(rename = "mousePressed")]
    Pressed,
    #[serde(rename = "mouseReleased")]
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Optional parts of a mouse event: button, modifier bits, click count
/// (2 for a double click).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MouseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<MouseButton>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_count: Option<i64>,
}

impl RemoteDebugger {
    /// Send one character as keyboard input: `rawKeyDown`, `char`, `keyUp`,
    /// in that order.
    pub async fn send_rune(&self, c: char) -> Result<()> {
        for kind in ["rawKeyDown", "char", "keyUp"] {
            self.send_request(
                "Input.dispatchKeyEvent",
                Some(json!({
                    "type": kind,
                    "windowsVirtualKeyCode": c as i64,
                    "nativeVirtualKeyCode": c as i64,
                    "unmodifiedText": c.to_string(),
                    "text": c.to_string(),
                })),
            )
            .await?;
        }

        Ok(())
    }

    /// Dispatch a mouse event at page coordinates. Pass a button (and
    /// possibly modifiers and a click count) through `options` to simulate
    /// presses.
    pub async fn mouse_event(
        &self,
        kind: MouseEventKind,
        x: i64,
        y: i64,
        options: MouseOptions,
    ) -> Result<()> {
        let mut params = Map::new();
        params.insert("type".into(), serde_json::to_value(kind)?);
        params.insert("x".into(), json!(x));
        params.insert("y".into(), json!(y));
        merge(&mut params, serde_json::to_value(&options)?);

        self.send_request("Input.dispatchMouseEvent", Some(Value::Object(params)))
            .await
            .map(drop)
    }
}
