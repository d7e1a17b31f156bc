//! Client for the Chrome DevTools Protocol.
//!
//! Connects to a Chromium remote debugging port, discovers tabs over the
//! `/json/*` HTTP surface, and drives the active tab over a single WebSocket
//! channel: commands are correlated to replies by id, protocol events are
//! dispatched to registered callbacks off a bounded queue.
//!
//! Design decisions:
//! 1. One WebSocket per session; switching tabs swaps the channel, it does
//!    not open a second one.
//! 2. Request/reply matching via id, events filtered at the reader so an
//!    unwatched event never costs queue capacity.
//! 3. A single session mutex serializes channel swaps, slot bookkeeping and
//!    callback registration; payload decoding happens outside it.

pub mod commands;
pub mod discovery;
pub mod error;
pub mod events;
pub mod protocol;
pub mod session;

mod channel;

pub use commands::dom::IdType;
pub use commands::emulation::{VirtualTimeOptions, VirtualTimePolicy};
pub use commands::fetch::{ContinueRequestOverrides, FetchRequestPattern, RequestStage};
pub use commands::input::{
    MouseButton, MouseEventKind, MouseOptions, MODIFIER_ALT, MODIFIER_COMMAND, MODIFIER_CTRL,
    MODIFIER_META, MODIFIER_NONE, MODIFIER_SHIFT,
};
pub use commands::network::{
    Cookie, ErrorReason, InterceptedRequestOverrides, InterceptionStage, RequestPattern,
    ResourceType,
};
pub use commands::page::{DownloadBehavior, NavigationEntry, NavigationResponse, PrintToPdfOptions};
pub use commands::profiler::{Profile, ProfileNode};
pub use commands::runtime::EvaluateOptions;
pub use discovery::{Domain, Tab, Version};
pub use error::{Error, EvaluateError, Result};
pub use events::{EventCallback, EVENT_CLOSED, EVENT_DISCONNECTED};
pub use protocol::Params;
pub use session::{ConnectOptions, RemoteDebugger};
