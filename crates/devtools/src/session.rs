//! The debugging session: bootstrap, request correlation, tab steering,
//! teardown.
//!
//! A single mutex serializes channel swaps, slot bookkeeping, callback
//! registration and the closing flag. Payload decoding and callback
//! invocation never happen under it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::HeaderMap;
use serde_json::value::RawValue;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::channel::{self, Channel};
use crate::discovery::{Discovery, Tab, Version};
use crate::error::{Error, Result};
use crate::events::{self, EventCallback, EventEnvelope, EVENT_QUEUE_SIZE};
use crate::protocol::{unmarshal, Command, Params, RequestId};

/// Default write buffer, large enough to send large scripts.
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 100 * 1024;

/// Connection-time configuration. The defaults are right for a local
/// headless browser.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Override the `Host` header on discovery requests.
    pub host_header: Option<String>,
    /// Extra headers sent with every discovery request.
    pub headers: HeaderMap,
    /// Write buffer for the debugging channel.
    pub write_buffer_size: usize,
    /// Cap on inbound frame size; `None` keeps the transport default.
    pub max_message_size: Option<usize>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host_header: None,
            headers: HeaderMap::new(),
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            max_message_size: None,
        }
    }
}

type ReplyPayload = Option<Box<RawValue>>;

/// State guarded by the session mutex.
pub(crate) struct Shared {
    pub channel: Option<Channel>,
    pub current_tab: String,
    pub next_id: RequestId,
    pub slots: HashMap<RequestId, oneshot::Sender<ReplyPayload>>,
    pub callbacks: HashMap<String, EventCallback>,
    pub closing: bool,
    /// Generation of the channel retired by close(); its reader is the one
    /// that announces the teardown.
    pub closed_generation: Option<u64>,
    /// Handed to each reader at spawn; taken on close so the dispatcher
    /// drains and exits once the last reader is gone.
    pub events: Option<mpsc::Sender<EventEnvelope>>,
    pub next_generation: u64,
}

pub(crate) struct Inner {
    pub discovery: Discovery,
    pub shared: Mutex<Shared>,
    pub closed: CancellationToken,
    pub verbose: AtomicBool,
    pub options: ConnectOptions,
}

impl Inner {
    pub(crate) async fn closed_channel_generation(&self) -> Option<u64> {
        self.shared.lock().await.closed_generation
    }

    /// Drop the channel after a detected disconnect, unblocking every
    /// outstanding caller with `Closed`. Returns false when the channel had
    /// already moved on.
    pub(crate) async fn retire_channel(&self, generation: u64) -> bool {
        let mut shared = self.shared.lock().await;
        match &shared.channel {
            Some(channel) if channel.generation == generation => {
                shared.channel = None;
                shared.current_tab.clear();
                shared.slots.clear();
                true
            }
            _ => false,
        }
    }
}

/// A debugging session against one browser instance.
///
/// Cheap to clone; all clones share the same channel and callbacks. Commands
/// may be issued concurrently from any number of tasks.
#[derive(Clone)]
pub struct RemoteDebugger {
    inner: Arc<Inner>,
}

impl RemoteDebugger {
    /// Connect to the remote debugger at `host:port`, attaching to the most
    /// recently active page tab.
    pub async fn connect(addr: &str, verbose: bool) -> Result<Self> {
        Self::connect_with(addr, verbose, ConnectOptions::default()).await
    }

    pub async fn connect_with(addr: &str, verbose: bool, options: ConnectOptions) -> Result<Self> {
        let discovery = Discovery::new(addr, &options)?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        let inner = Arc::new(Inner {
            discovery,
            shared: Mutex::new(Shared {
                channel: None,
                current_tab: String::new(),
                next_id: 0,
                slots: HashMap::new(),
                callbacks: HashMap::new(),
                closing: false,
                closed_generation: None,
                events: Some(event_tx),
                next_generation: 0,
            }),
            closed: CancellationToken::new(),
            verbose: AtomicBool::new(verbose),
            options,
        });

        let remote = Self {
            inner: inner.clone(),
        };
        remote.connect_ws(None).await?;

        events::spawn_dispatcher(inner, event_rx);
        Ok(remote)
    }

    /// Open the debugging channel against `tab`, or against the first page
    /// tab when `tab` is `None`. A no-op when already bound to that tab;
    /// otherwise the old channel is retired and a fresh reader/writer pair
    /// is started on the new one.
    pub(crate) async fn connect_ws(&self, tab: Option<&Tab>) -> Result<()> {
        let tab = match tab {
            Some(tab) if !tab.ws_url.is_empty() => tab.clone(),
            other => {
                let tabs = self.inner.discovery.tab_list(Some("page")).await?;
                let Some(first) = tabs.first().cloned() else {
                    return Err(Error::NoActiveTab);
                };

                match other {
                    None => first,
                    Some(wanted) => {
                        let mut wanted = wanted.clone();
                        if let Some(listed) = tabs.into_iter().find(|t| t.id == wanted.id) {
                            wanted.ws_url = listed.ws_url;
                        }
                        wanted
                    }
                }
            }
        };

        // Detach the current channel first; dropping the handle retires the
        // writer out of line and the old reader exits on generation mismatch.
        {
            let mut shared = self.inner.shared.lock().await;
            if shared.closing {
                return Err(Error::Closed);
            }

            if let Some(channel) = &shared.channel {
                if channel.tab_id == tab.id {
                    // nothing to do
                    return Ok(());
                }

                if self.is_verbose() {
                    debug!("disconnecting from current tab, id {}", shared.current_tab);
                }
                shared.channel = None;
                shared.current_tab.clear();
            }
        }

        if tab.ws_url.is_empty() {
            return Err(Error::NoWsUrl);
        }

        if self.is_verbose() {
            debug!("connecting to tab {}", tab.ws_url);
        }

        let stream = match channel::dial(&tab.ws_url, &self.inner.options).await {
            Ok(stream) => stream,
            Err(err) => {
                if self.is_verbose() {
                    debug!("dial error: {err}");
                }
                return Err(err);
            }
        };

        let (sink, read) = stream.split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        let (generation, event_tx) = {
            let mut shared = self.inner.shared.lock().await;
            if shared.closing {
                return Err(Error::Closed);
            }

            shared.next_generation += 1;
            let generation = shared.next_generation;
            shared.channel = Some(Channel {
                generation,
                tab_id: tab.id.clone(),
                outbound: out_tx,
            });
            shared.current_tab = tab.id.clone();
            (generation, shared.events.clone())
        };

        channel::spawn_writer(sink, out_rx, self.inner.clone());
        if let Some(event_tx) = event_tx {
            events::spawn_reader(self.inner.clone(), read, generation, event_tx);
        }

        Ok(())
    }

    /// Close the session. Outstanding callers unblock with `Closed` and a
    /// single synthetic `RemoteDebugger.closed` event is delivered.
    pub async fn close(&self) -> Result<()> {
        let retired = {
            let mut shared = self.inner.shared.lock().await;
            if shared.closing {
                return Ok(());
            }
            shared.closing = true;
            shared.current_tab.clear();
            shared.events.take();
            shared.slots.clear();

            let retired = shared.channel.take();
            shared.closed_generation = retired.as_ref().map(|c| c.generation);
            retired
        };

        // Wake whatever is parked on the channel or the event queue; the
        // closing flag is already visible, so the reader cannot mistake the
        // socket shutdown for a peer disconnect.
        self.inner.closed.cancel();
        drop(retired);
        Ok(())
    }

    /// Toggle frame-level SEND/REPLY/EVENT tracing.
    pub fn verbose(&self, enable: bool) {
        self.inner.verbose.store(enable, Ordering::Relaxed);
    }

    pub(crate) fn is_verbose(&self) -> bool {
        self.inner.verbose.load(Ordering::Relaxed)
    }

    /// Register `callback` for an event method. One callback per method;
    /// the last registration wins. Events arriving before registration are
    /// not replayed.
    pub async fn callback_event<F>(&self, method: &str, callback: F)
    where
        F: Fn(Params) + Send + Sync + 'static,
    {
        self.inner
            .shared
            .lock()
            .await
            .callbacks
            .insert(method.to_owned(), Arc::new(callback));
    }

    /// Send a command and return the reply as an untyped map.
    pub async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Params> {
        let raw = self.send_raw_request(method, params).await?;
        if raw.is_empty() {
            return Ok(Params::new());
        }
        unmarshal(&raw)
    }

    /// Send a command and return the raw reply bytes, empty for void
    /// replies. Used where the reply decodes into a typed record.
    pub async fn send_raw_request(&self, method: &str, params: Option<Value>) -> Result<Vec<u8>> {
        let (id, outbound, slot) = {
            let mut shared = self.inner.shared.lock().await;
            let Some(channel) = &shared.channel else {
                return Err(Error::Closed);
            };
            let outbound = channel.outbound.clone();

            let id = shared.next_id;
            shared.next_id += 1;

            let (tx, rx) = oneshot::channel();
            shared.slots.insert(id, tx);
            (id, outbound, rx)
        };

        let command = Command {
            id,
            method: method.to_owned(),
            params,
        };

        if outbound.send(command).is_err() {
            self.inner.shared.lock().await.slots.remove(&id);
            return Err(Error::Closed);
        }

        let reply = slot.await;
        self.inner.shared.lock().await.slots.remove(&id);

        match reply {
            Ok(Some(raw)) => Ok(raw.get().as_bytes().to_vec()),
            Ok(None) => Ok(Vec::new()),
            // slot dropped by teardown
            Err(_) => Err(Error::Closed),
        }
    }

    /// Version information (protocol, browser, etc.).
    pub async fn version(&self) -> Result<Version> {
        self.inner.discovery.version().await
    }

    /// The DevTools protocol specification, passed through undecoded.
    pub async fn protocol(&self) -> Result<Value> {
        self.inner.discovery.protocol().await
    }

    /// List opened tabs, optionally restricted to one type (e.g. "page").
    /// Tabs come back most recently used first, so the current tab is the
    /// first one of type "page".
    pub async fn tab_list(&self, filter: Option<&str>) -> Result<Vec<Tab>> {
        self.inner.discovery.tab_list(filter).await
    }

    /// Create a tab and rebind the session to it.
    pub async fn new_tab(&self, url: Option<&str>) -> Result<Tab> {
        let tab = self.inner.discovery.new_tab(url).await?;
        self.connect_ws(Some(&tab)).await?;
        Ok(tab)
    }

    /// Bring `tab` to the foreground and rebind the session to it.
    pub async fn activate_tab(&self, tab: &Tab) -> Result<()> {
        self.inner.discovery.activate(&tab.id).await?;
        self.connect_ws(Some(tab)).await
    }

    /// Dispose of `tab`. Does not touch the session binding; closing the
    /// active tab will surface as a disconnect.
    pub async fn close_tab(&self, tab: &Tab) -> Result<()> {
        self.inner.discovery.close_tab(&tab.id).await
    }
}
