//! Event pump: the per-channel reader and the session-wide dispatcher.
//!
//! The reader decodes frames, hands replies to their slots and pushes
//! watched events onto a bounded queue. The dispatcher drains that queue on
//! its own task and invokes callbacks outside the session mutex, decoding
//! `params` lazily.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures_util::StreamExt;
use serde_json::value::RawValue;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, warn};

use crate::channel::{permanent_error, WsRead};
use crate::protocol::{Frame, Params};
use crate::session::Inner;

/// Emitted locally when the session is closed by the application.
pub const EVENT_CLOSED: &str = "RemoteDebugger.closed";

/// Emitted locally when the channel dies while the session is still open.
pub const EVENT_DISCONNECTED: &str = "RemoteDebugger.disconnected";

/// Bound on the decoded-event backlog. At capacity the reader waits for
/// queue progress or the closed-signal; it never drops a watched event.
pub(crate) const EVENT_QUEUE_SIZE: usize = 256;

/// One callback per event method, last write wins.
pub type EventCallback = Arc<dyn Fn(Params) + Send + Sync>;

/// A decoded event waiting for dispatch. `params` stays raw until the
/// dispatcher is about to invoke the callback.
pub(crate) struct EventEnvelope {
    pub method: String,
    pub params: Option<Box<RawValue>>,
}

impl EventEnvelope {
    fn synthetic(method: &str) -> Self {
        Self {
            method: method.to_owned(),
            params: None,
        }
    }
}

/// Reader worker, bound to one channel instance by generation. Exits
/// silently when the session has moved on to another channel; otherwise its
/// exit is terminal for the session and announced with a synthetic event.
pub(crate) fn spawn_reader(
    inner: Arc<Inner>,
    mut read: WsRead,
    generation: u64,
    events: mpsc::Sender<EventEnvelope>,
) {
    tokio::spawn(async move {
        let mut remote_closed = false;

        loop {
            let message = tokio::select! {
                _ = inner.closed.cancelled() => {
                    remote_closed = true;
                    break;
                }
                message = read.next() => message,
            };

            // Closing and swap decisions come from one consistent view of
            // session state: the socket shutting down because close()
            // retired it must not read as a peer disconnect.
            {
                let shared = inner.shared.lock().await;
                if shared.closing {
                    remote_closed = true;
                    break;
                }
                if shared.channel.as_ref().map(|c| c.generation) != Some(generation) {
                    // retired by a tab switch
                    return;
                }
            }

            let text = match message {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => {
                    warn!("connection closed by peer");
                    break;
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!("read message: {err}");
                    if permanent_error(&err) {
                        break;
                    }
                    continue;
                }
            };

            let frame: Frame = match serde_json::from_str(&text) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("unmarshal {text}: {err}");
                    continue;
                }
            };

            if frame.is_event() {
                let method = frame.method.unwrap_or_default();

                if inner.verbose.load(Ordering::Relaxed) {
                    debug!(
                        "EVENT {method} {}",
                        frame.params.as_deref().map_or("", RawValue::get)
                    );
                }

                let watched = inner.shared.lock().await.callbacks.contains_key(&method);
                if !watched {
                    // don't queue unrequested events
                    continue;
                }

                let envelope = EventEnvelope {
                    method,
                    params: frame.params,
                };

                tokio::select! {
                    _ = inner.closed.cancelled() => {
                        remote_closed = true;
                        break;
                    }
                    sent = events.send(envelope) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            } else {
                let Some(id) = frame.id else {
                    warn!("frame with neither method nor id: {text}");
                    continue;
                };

                if inner.verbose.load(Ordering::Relaxed) {
                    debug!(
                        "REPLY {id} {}",
                        frame.result.as_deref().map_or("", RawValue::get)
                    );
                }

                let slot = inner.shared.lock().await.slots.remove(&id);
                match slot {
                    Some(slot) => {
                        // receiver may have given up; nothing to do then
                        let _ = slot.send(frame.result);
                    }
                    None => debug!("reply for unknown request {id}"),
                }
            }
        }

        if remote_closed {
            // only the reader of the channel close() retired announces the
            // teardown; a reader already retired by a swap stays silent
            if inner.closed_channel_generation().await == Some(generation) {
                let _ = events.send(EventEnvelope::synthetic(EVENT_CLOSED)).await;
            }
        } else if inner.retire_channel(generation).await {
            // we should still be connected but the channel is gone
            let _ = events
                .send(EventEnvelope::synthetic(EVENT_DISCONNECTED))
                .await;
        }
    });
}

/// Dispatcher worker: single consumer of the event queue. Callbacks are
/// untrusted; a panic is logged and the pump keeps going.
pub(crate) fn spawn_dispatcher(inner: Arc<Inner>, mut events: mpsc::Receiver<EventEnvelope>) {
    tokio::spawn(async move {
        while let Some(envelope) = events.recv().await {
            let callback = {
                let shared = inner.shared.lock().await;
                shared.callbacks.get(&envelope.method).cloned()
            };

            let Some(callback) = callback else { continue };

            let params = match &envelope.params {
                None => Params::new(),
                Some(raw) => match serde_json::from_str(raw.get()) {
                    Ok(params) => params,
                    Err(err) => {
                        warn!("unmarshal {}: {err}", raw.get());
                        continue;
                    }
                },
            };

            if catch_unwind(AssertUnwindSafe(|| callback(params))).is_err() {
                error!("callback for {} panicked", envelope.method);
            }
        }
    });
}
