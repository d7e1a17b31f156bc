//! The command catalog: thin typed facades over `send_request`, grouped by
//! protocol domain.

pub mod dom;
pub mod emulation;
pub mod fetch;
pub mod input;
pub mod meta;
pub mod network;
pub mod page;
pub mod profiler;
pub mod runtime;

use serde_json::{Map, Value};

/// Overlay serialized option fields onto a params object.
pub(crate) fn merge(params: &mut Map<String, Value>, overrides: Value) {
    if let Value::Object(map) = overrides {
        for (key, value) in map {
            params.insert(key, value);
        }
    }
}
