//! Fetch domain: request pausing, the successor to legacy interception.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::merge;
use super::network::{ErrorReason, ResourceType};
use crate::error::Result;
use crate::session::RemoteDebugger;

/// Stage at which a request pauses: before it is sent, or once the response
/// headers are in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestStage {
    Request,
    Response,
}

/// Pattern for `Fetch.enable`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequestPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_stage: Option<RequestStage>,
}

/// Overrides applied when continuing a paused request.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestOverrides {
    /// Rewrite the URL, invisibly to the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl RemoteDebugger {
    /// Enable or disable `Fetch.requestPaused` events. With patterns, only
    /// matching requests pause; without, all of them do. A paused request
    /// waits until `continue_request`, `fail_request` or `fulfill_request`.
    pub async fn enable_request_paused(
        &self,
        enable: bool,
        patterns: &[FetchRequestPattern],
    ) -> Result<()> {
        if !enable {
            return self.send_request("Fetch.disable", None).await.map(drop);
        }

        let params = if patterns.is_empty() {
            None
        } else {
            Some(json!({ "patterns": patterns }))
        };

        self.send_request("Fetch.enable", params).await.map(drop)
    }

    /// Let a paused request continue, with optional modifications.
    pub async fn continue_request(
        &self,
        request_id: &str,
        overrides: ContinueRequestOverrides,
    ) -> Result<()> {
        let mut params = Map::new();
        params.insert("requestId".into(), json!(request_id));
        merge(&mut params, serde_json::to_value(&overrides)?);

        self.send_request("Fetch.continueRequest", Some(Value::Object(params)))
            .await
            .map(drop)
    }

    /// Fail a paused request with the given reason.
    pub async fn fail_request(&self, request_id: &str, error_reason: ErrorReason) -> Result<()> {
        self.send_request(
            "Fetch.failRequest",
            Some(json!({
                "requestId": request_id,
                "errorReason": error_reason,
            })),
        )
        .await
        .map(drop)
    }

    /// Answer a paused request with a synthetic response.
    pub async fn fulfill_request(
        &self,
        request_id: &str,
        response_code: i64,
        response_phrase: Option<&str>,
        headers: Option<&HashMap<String, String>>,
        body: Option<&[u8]>,
    ) -> Result<()> {
        let mut params = Map::new();
        params.insert("requestId".into(), json!(request_id));
        params.insert("responseCode".into(), json!(response_code));
        params.insert("responseHeaders".into(), json!(headers));

        if let Some(phrase) = response_phrase {
            params.insert("responsePhrase".into(), json!(phrase));
        }
        if let Some(body) = body {
            params.insert("body".into(), json!(STANDARD.encode(body)));
        }

        self.send_request("Fetch.fulfillRequest", Some(Value::Object(params)))
            .await
            .map(drop)
    }

    /// The body of a paused response.
    pub async fn fetch_response_body(&self, request_id: &str) -> Result<Vec<u8>> {
        let res = self
            .send_request(
                "Fetch.getResponseBody",
                Some(json!({ "requestId": request_id })),
            )
            .await?;

        let Some(body) = res.string("body") else {
            return Ok(Vec::new());
        };

        if res.boolean("base64Encoded").unwrap_or(false) {
            Ok(STANDARD.decode(body)?)
        } else {
            Ok(body.as_bytes().to_vec())
        }
    }
}
