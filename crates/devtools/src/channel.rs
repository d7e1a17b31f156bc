//! The debugging channel: one WebSocket per session.
//!
//! A `Channel` is the session's handle on the active connection. The reader
//! (see `events`) takes the read half by value at spawn, tagged with the
//! channel's generation; it exits silently once the session's current
//! channel is no longer it. That ownership rule is what makes tab switching
//! safe with a read in flight.

use std::io::ErrorKind;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::error::Result;
use crate::protocol::Command;
use crate::session::{ConnectOptions, Inner};

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;
pub(crate) type WsRead = SplitStream<WsStream>;

/// Handle on the active connection, held in session state under the mutex.
/// Dropping it closes the outbound queue, which retires the writer worker
/// and with it the socket.
pub(crate) struct Channel {
    pub generation: u64,
    pub tab_id: String,
    pub outbound: mpsc::UnboundedSender<Command>,
}

pub(crate) async fn dial(ws_url: &str, options: &ConnectOptions) -> Result<WsStream> {
    let config = WebSocketConfig {
        write_buffer_size: options.write_buffer_size,
        max_message_size: options.max_message_size,
        ..Default::default()
    };

    let (stream, _) = connect_async_with_config(ws_url, Some(config), false).await?;
    Ok(stream)
}

/// Writer worker: single consumer of the outbound queue, one JSON text
/// frame per envelope, in submission order. Exits when the queue closes and
/// takes the write half down with it.
pub(crate) fn spawn_writer(
    mut sink: WsSink,
    mut outbound: mpsc::UnboundedReceiver<Command>,
    inner: Arc<Inner>,
) {
    tokio::spawn(async move {
        while let Some(command) = outbound.recv().await {
            let frame = match serde_json::to_string(&command) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!("encode command {}: {err}", command.method);
                    continue;
                }
            };

            if inner.verbose.load(Ordering::Relaxed) {
                debug!("SEND {frame}");
            }

            if let Err(err) = sink.send(Message::Text(frame)).await {
                warn!("write message: {err}");
            }
        }

        let _ = sink.close().await;
    });
}

/// Whether a read error means the connection is gone, as opposed to a
/// frame-level problem worth skipping.
pub(crate) fn permanent_error(err: &tungstenite::Error) -> bool {
    match err {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => true,
        tungstenite::Error::Io(io) => !matches!(
            io.kind(),
            ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::TimedOut
        ),
        tungstenite::Error::Protocol(
            tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
        ) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_split_by_kind() {
        let gone = tungstenite::Error::Io(std::io::Error::from(ErrorKind::ConnectionReset));
        assert!(permanent_error(&gone));

        let transient = tungstenite::Error::Io(std::io::Error::from(ErrorKind::TimedOut));
        assert!(!permanent_error(&transient));
    }

    #[test]
    fn closed_is_permanent() {
        assert!(permanent_error(&tungstenite::Error::ConnectionClosed));
        assert!(permanent_error(&tungstenite::Error::AlreadyClosed));
    }
}
