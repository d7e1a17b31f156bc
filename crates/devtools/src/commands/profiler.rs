//! Profiler domain: CPU profiles and code coverage.

use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::protocol::{float_as_i64, float_seq_as_i64};
use crate::session::RemoteDebugger;

/// A CPU profile. Timestamps and sample ids arrive as floats and are
/// coerced on read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub nodes: Vec<ProfileNode>,
    #[serde(deserialize_with = "float_as_i64")]
    pub start_time: i64,
    #[serde(deserialize_with = "float_as_i64")]
    pub end_time: i64,
    #[serde(deserialize_with = "float_seq_as_i64")]
    pub samples: Vec<i64>,
    #[serde(deserialize_with = "float_seq_as_i64")]
    pub time_deltas: Vec<i64>,
}

/// A node in a CPU profile. The experimental fields stay raw so callers can
/// decode them against whatever protocol revision they target.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileNode {
    #[serde(deserialize_with = "float_as_i64")]
    pub id: i64,
    pub call_frame: Option<Box<RawValue>>,
    #[serde(deserialize_with = "float_as_i64")]
    pub hit_count: i64,
    #[serde(deserialize_with = "float_seq_as_i64")]
    pub children: Vec<i64>,
    pub deopt_reason: String,
    pub position_ticks: Option<Box<RawValue>>,
}

impl RemoteDebugger {
    pub async fn start_profiler(&self) -> Result<()> {
        self.send_request("Profiler.start", None).await.map(drop)
    }

    /// Stop the profiler and return the collected profile.
    pub async fn stop_profiler(&self) -> Result<Profile> {
        let raw = self.send_raw_request("Profiler.stop", None).await?;

        #[derive(Deserialize)]
        struct Reply {
            profile: Profile,
        }

        let reply: Reply = serde_json::from_slice(&raw)?;
        Ok(reply.profile)
    }

    /// Set the sampling interval in microseconds. Must be called before
    /// `start_profiler`.
    pub async fn set_profiler_sampling_interval(&self, interval: i64) -> Result<()> {
        self.send_request(
            "Profiler.setSamplingInterval",
            Some(json!({ "interval": interval })),
        )
        .await
        .map(drop)
    }

    /// Enable precise code coverage collection.
    pub async fn start_precise_coverage(&self, call_count: bool, detailed: bool) -> Result<()> {
        self.send_request(
            "Profiler.startPreciseCoverage",
            Some(json!({
                "callCount": call_count,
                "detailed": detailed,
            })),
        )
        .await
        .map(drop)
    }

    /// Disable precise code coverage collection.
    pub async fn stop_precise_coverage(&self) -> Result<()> {
        self.send_request("Profiler.stopPreciseCoverage", None)
            .await
            .map(drop)
    }

    /// Coverage data for the current isolate: precise (resetting execution
    /// counters) or best-effort.
    pub async fn get_precise_coverage(&self, precise: bool) -> Result<Vec<Value>> {
        let method = if precise {
            "Profiler.takePreciseCoverage"
        } else {
            "Profiler.getBestEffortCoverage"
        };

        let res = self.send_request(method, None).await?;

        res.get("result")
            .and_then(Value::as_array)
            .cloned()
            .ok_or(Error::NoResponse)
    }
}
