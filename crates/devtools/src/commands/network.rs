//! Network domain: cookies, cache, blocking, and legacy request
//! interception.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use super::merge;
use crate::error::{Error, Result};
use crate::session::RemoteDebugger;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub size: i64,
    pub expires: f64,
    pub http_only: bool,
    pub secure: bool,
    pub session: bool,
    pub same_site: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    XHR,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    SignedExchange,
    Ping,
    CSPViolationReport,
    Other,
}

/// Stage at which a legacy interception fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InterceptionStage {
    Request,
    HeadersReceived,
}

/// What error to abort an intercepted or paused request with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorReason {
    Failed,
    Aborted,
    TimedOut,
    AccessDenied,
    ConnectionClosed,
    ConnectionReset,
    ConnectionRefused,
    ConnectionAborted,
    ConnectionFailed,
    NameNotResolved,
    InternetDisconnected,
    AddressUnreachable,
    BlockedByClient,
    BlockedByResponse,
}

/// Pattern for `Network.setRequestInterception`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interception_stage: Option<InterceptionStage>,
}

/// Overrides applied when letting an intercepted request continue. Unset
/// fields leave the request untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptedRequestOverrides {
    /// Fail the request with this reason instead of continuing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<ErrorReason>,
    /// Complete the request with this base64-encoded raw response,
    /// including status line and headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
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

fn decode_body(res: &crate::protocol::Params) -> Result<Vec<u8>> {
    let Some(body) = res.string("body") else {
        return Ok(Vec::new());
    };

    if res.boolean("base64Encoded").unwrap_or(false) {
        Ok(STANDARD.decode(body)?)
    } else {
        Ok(body.as_bytes().to_vec())
    }
}

impl RemoteDebugger {
    /// The response body for a request id taken from a
    /// `Network.responseReceived` event.
    pub async fn get_response_body(&self, request_id: &str) -> Result<Vec<u8>> {
        let res = self
            .send_request(
                "Network.getResponseBody",
                Some(json!({ "requestId": request_id })),
            )
            .await?;

        decode_body(&res)
    }

    /// The response body observed by a legacy interception.
    pub async fn get_response_body_for_interception(
        &self,
        interception_id: &str,
    ) -> Result<Vec<u8>> {
        let res = self
            .send_request(
                "Network.getResponseBodyForInterception",
                Some(json!({ "interceptionId": interception_id })),
            )
            .await?;

        decode_body(&res)
    }

    /// Cookies for the given URLs, or for the current page's URLs when
    /// `urls` is `None`.
    pub async fn get_cookies(&self, urls: Option<&[&str]>) -> Result<Vec<Cookie>> {
        let params = urls.map(|urls| json!({ "urls": urls }));
        let raw = self.send_raw_request("Network.getCookies", params).await?;

        #[derive(Deserialize)]
        struct Reply {
            #[serde(default)]
            cookies: Vec<Cookie>,
        }

        let reply: Reply = serde_json::from_slice(&raw).map_err(|err| {
            warn!("unmarshal cookies: {err}");
            err
        })?;

        Ok(reply.cookies)
    }

    /// All browser cookies.
    pub async fn get_all_cookies(&self) -> Result<Vec<Cookie>> {
        self.get_cookies(None).await
    }

    /// Set a batch of cookies.
    pub async fn set_cookies(&self, cookies: &[Cookie]) -> Result<()> {
        self.send_request("Network.setCookies", Some(json!({ "cookies": cookies })))
            .await
            .map(drop)
    }

    /// Set one cookie. Returns the peer's `success` bit; a missing field
    /// counts as failure.
    pub async fn set_cookie(&self, cookie: &Cookie) -> Result<bool> {
        let mut params = Map::new();
        params.insert("name".into(), json!(cookie.name));
        params.insert("value".into(), json!(cookie.value));
        if !cookie.domain.is_empty() {
            params.insert("domain".into(), json!(cookie.domain));
        }
        if !cookie.path.is_empty() {
            params.insert("path".into(), json!(cookie.path));
        }
        if cookie.secure {
            params.insert("secure".into(), json!(true));
        }
        if cookie.http_only {
            params.insert("httpOnly".into(), json!(true));
        }
        if !cookie.same_site.is_empty() {
            params.insert("sameSite".into(), json!(cookie.same_site));
        }
        if cookie.expires > 0.0 {
            params.insert("expires".into(), json!(cookie.expires));
        }

        let res = self
            .send_request("Network.setCookies", Some(Value::Object(params)))
            .await?;

        Ok(res.boolean("success").unwrap_or(false))
    }

    /// Block URLs from loading; `*` wildcards are allowed.
    pub async fn set_blocked_urls(&self, urls: &[&str]) -> Result<()> {
        self.send_request("Network.setBlockedURLs", Some(json!({ "urls": urls })))
            .await
            .map(drop)
    }

    /// Override the default user agent.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.send_request(
            "Network.setUserAgentOverride",
            Some(json!({ "userAgent": user_agent })),
        )
        .await
        .map(drop)
    }

    /// The certificate chain seen for `origin`.
    pub async fn get_certificate(&self, origin: &str) -> Result<Vec<String>> {
        let res = self
            .send_request("Network.getCertificate", Some(json!({ "origin": origin })))
            .await?;

        let names = res
            .get("tableNames")
            .and_then(Value::as_array)
            .ok_or(Error::NoResponse)?;

        Ok(names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect())
    }

    pub async fn clear_browser_cache(&self) -> Result<()> {
        self.send_request("Network.clearBrowserCache", None)
            .await
            .map(drop)
    }

    pub async fn clear_browser_cookies(&self) -> Result<()> {
        self.send_request("Network.clearBrowserCookies", None)
            .await
            .map(drop)
    }

    /// Toggle cache bypass for each request.
    pub async fn set_cache_disabled(&self, disabled: bool) -> Result<()> {
        self.send_request(
            "Network.setCacheDisabled",
            Some(json!({ "cacheDisabled": disabled })),
        )
        .await
        .map(drop)
    }

    /// Toggle service worker bypass for each request.
    pub async fn set_bypass_service_worker(&self, bypass: bool) -> Result<()> {
        self.send_request(
            "Network.setBypassServiceWorker",
            Some(json!({ "bypass": bypass })),
        )
        .await
        .map(drop)
    }

    /// Intercept requests matching the given patterns.
    pub async fn set_request_interception(&self, patterns: &[RequestPattern]) -> Result<()> {
        self.send_request(
            "Network.setRequestInterception",
            Some(json!({ "patterns": patterns })),
        )
        .await
        .map(drop)
    }

    /// Sugar over `set_request_interception`: everything, or an empty
    /// pattern list.
    pub async fn enable_request_interception(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.set_request_interception(&[RequestPattern {
                url_pattern: Some("*".to_owned()),
                ..Default::default()
            }])
            .await
        } else {
            self.set_request_interception(&[]).await
        }
    }

    /// Answer a `Network.requestIntercepted` event: continue (possibly
    /// modified), fail, or complete the request. A redirect encountered on
    /// the way triggers another `requestIntercepted` with the same id.
    pub async fn continue_intercepted_request(
        &self,
        interception_id: &str,
        overrides: InterceptedRequestOverrides,
    ) -> Result<()> {
        let mut params = Map::new();
        params.insert("interceptionId".into(), json!(interception_id));
        merge(&mut params, serde_json::to_value(&overrides)?);

        self.send_request(
            "Network.continueInterceptedRequest",
            Some(Value::Object(params)),
        )
        .await
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_wire_names() {
        let cookie: Cookie = serde_json::from_str(
            r#"{"name":"sid","value":"1","domain":".example.com","path":"/",
                "size":5,"expires":0,"httpOnly":true,"secure":false,
                "session":true,"sameSite":"Lax"}"#,
        )
        .unwrap();
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site, "Lax");
    }

    #[test]
    fn request_pattern_skips_unset_fields() {
        let pattern = RequestPattern {
            url_pattern: Some("*".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&pattern).unwrap(),
            json!({"urlPattern": "*"})
        );

        let full = RequestPattern {
            url_pattern: Some("*.js".into()),
            resource_type: Some(ResourceType::Script),
            interception_stage: Some(InterceptionStage::HeadersReceived),
        };
        assert_eq!(
            serde_json::to_value(&full).unwrap(),
            json!({
                "urlPattern": "*.js",
                "resourceType": "Script",
                "interceptionStage": "HeadersReceived",
            })
        );
    }

    #[test]
    fn error_reason_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorReason::InternetDisconnected).unwrap(),
            "InternetDisconnected"
        );
        assert_eq!(
            serde_json::to_value(ErrorReason::BlockedByResponse).unwrap(),
            "BlockedByResponse"
        );
    }

    #[test]
    fn resource_type_wire_names() {
        assert_eq!(serde_json::to_value(ResourceType::XHR).unwrap(), "XHR");
        assert_eq!(
            serde_json::to_value(ResourceType::CSPViolationReport).unwrap(),
            "CSPViolationReport"
        );
    }
}
