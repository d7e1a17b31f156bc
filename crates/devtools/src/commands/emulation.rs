//! Emulation domain: viewport overrides and virtual time.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::merge;
use crate::error::Result;
use crate::session::RemoteDebugger;

/// How the synthetic clock advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VirtualTimePolicy {
    /// Fast-forward to the next delayed task when out of immediate work.
    Advance,
    /// The virtual time base may not advance.
    Pause,
    /// Do not advance while resource fetches are pending.
    PauseIfNetworkFetchesPending,
}

/// Optional parts of `Emulation.setVirtualTimePolicy`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTimeOptions {
    /// Milliseconds of virtual time after which a `virtualTimeBudgetExpired`
    /// event fires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<i64>,
    /// Task cap before virtual time is forced forwards to avoid deadlock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_virtual_time_task_starvation_count: Option<i64>,
    /// Defer the policy change until a frame starts navigating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_navigation: Option<bool>,
    /// Initial override for the wall clock, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_virtual_time: Option<f64>,
}

fn virtual_time_params(
    policy: VirtualTimePolicy,
    budget_ms: i64,
    options: &VirtualTimeOptions,
) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    params.insert("policy".into(), serde_json::to_value(policy)?);

    if budget_ms > 0 {
        params.insert("budget".into(), json!(budget_ms));
        params.insert("waitForNavigation".into(), json!(true));
    }

    merge(&mut params, serde_json::to_value(options)?);
    Ok(params)
}

impl RemoteDebugger {
    /// Resize the page's frame/viewport. Does not affect the browser
    /// window; handy for sizing screenshots.
    pub async fn set_visible_size(&self, width: i64, height: i64) -> Result<()> {
        self.send_request(
            "Emulation.setVisibleSize",
            Some(json!({
                "width": width,
                "height": height,
            })),
        )
        .await
        .map(drop)
    }

    /// Override device dimensions, scale and mobile behavior; used for
    /// mobile-viewport screenshots.
    pub async fn set_device_metrics_override(
        &self,
        width: i64,
        height: i64,
        device_scale_factor: f64,
        mobile: bool,
        fit_window: bool,
    ) -> Result<()> {
        self.send_request(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": device_scale_factor,
                "mobile": mobile,
                "fitWindow": fit_window,
            })),
        )
        .await
        .map(drop)
    }

    /// Replace real time with a synthetic source. Supersedes any previous
    /// time budget. A positive `budget_ms` also defaults
    /// `waitForNavigation` to true; explicit options override both.
    pub async fn set_virtual_time_policy(
        &self,
        policy: VirtualTimePolicy,
        budget_ms: i64,
        options: VirtualTimeOptions,
    ) -> Result<()> {
        let params = virtual_time_params(policy, budget_ms, &options)?;
        self.send_request("Emulation.setVirtualTimePolicy", Some(Value::Object(params)))
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_wire_names() {
        assert_eq!(
            serde_json::to_value(VirtualTimePolicy::PauseIfNetworkFetchesPending).unwrap(),
            "pauseIfNetworkFetchesPending"
        );
        assert_eq!(serde_json::to_value(VirtualTimePolicy::Advance).unwrap(), "advance");
    }

    #[test]
    fn budget_defaults_wait_for_navigation() {
        let params = virtual_time_params(
            VirtualTimePolicy::Advance,
            5000,
            &VirtualTimeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            Value::Object(params),
            json!({"policy": "advance", "budget": 5000, "waitForNavigation": true})
        );
    }

    #[test]
    fn explicit_options_override_budget_defaults() {
        let params = virtual_time_params(
            VirtualTimePolicy::Pause,
            1000,
            &VirtualTimeOptions {
                wait_for_navigation: Some(false),
                max_virtual_time_task_starvation_count: Some(100),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            Value::Object(params),
            json!({
                "policy": "pause",
                "budget": 1000,
                "waitForNavigation": false,
                "maxVirtualTimeTaskStarvationCount": 100,
            })
        );
    }

    #[test]
    fn zero_budget_sends_policy_only() {
        let params =
            virtual_time_params(VirtualTimePolicy::Pause, 0, &VirtualTimeOptions::default())
                .unwrap();
        assert_eq!(Value::Object(params), json!({"policy": "pause"}));
    }
}
