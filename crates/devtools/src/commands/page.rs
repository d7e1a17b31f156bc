//! Page domain: navigation, capture, downloads, dialogs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::protocol::float_as_i64;
use crate::session::RemoteDebugger;

/// A navigation history entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavigationEntry {
    #[serde(default, deserialize_with = "float_as_i64")]
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

/// Reply to a `Page.navigationRequested`/`redirectRequested` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavigationResponse {
    Proceed,
    Cancel,
    CancelAndIgnore,
}

/// Download handling policy for `Page.setDownloadBehavior`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadBehavior {
    Allow,
    AllowAndName,
    Deny,
    Default,
}

/// Options for `Page.printToPDF`. Unset fields are left to the peer's
/// defaults.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintToPdfOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landscape: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_header_footer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_background: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_left: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_ranges: Option<String>,
}

impl RemoteDebugger {
    /// Navigate to `url`. Returns the frame id, or `Error::Navigation` when
    /// the peer reports an `errorText`.
    pub async fn navigate(&self, url: &str) -> Result<String> {
        let res = self
            .send_request("Page.navigate", Some(json!({ "url": url })))
            .await?;

        if let Some(text) = res.string("errorText") {
            return Err(Error::Navigation(text.to_owned()));
        }

        Ok(res.string("frameId").unwrap_or_default().to_owned())
    }

    /// Reload the current page, bypassing the cache.
    pub async fn reload(&self) -> Result<()> {
        self.send_request("Page.reload", Some(json!({ "ignoreCache": true })))
            .await
            .map(drop)
    }

    /// Navigation history for the current page: the index of the current
    /// entry, and all entries.
    pub async fn get_navigation_history(&self) -> Result<(i64, Vec<NavigationEntry>)> {
        let raw = self
            .send_raw_request("Page.getNavigationHistory", None)
            .await?;

        #[derive(Deserialize)]
        struct Reply {
            #[serde(rename = "currentIndex", default, deserialize_with = "float_as_i64")]
            current: i64,
            #[serde(default)]
            entries: Vec<NavigationEntry>,
        }

        let reply: Reply = serde_json::from_slice(&raw)?;
        Ok((reply.current, reply.entries))
    }

    /// Toggle navigation throttling, which makes the peer emit
    /// `navigationRequested` events and wait for `process_navigation`.
    pub async fn set_control_navigations(&self, enabled: bool) -> Result<()> {
        self.send_request("Page.setControlNavigations", Some(json!({ "enabled": enabled })))
            .await
            .map(drop)
    }

    /// Answer a throttled navigation.
    pub async fn process_navigation(
        &self,
        navigation_id: i64,
        response: NavigationResponse,
    ) -> Result<()> {
        self.send_request(
            "Page.processNavigation",
            Some(json!({
                "response": response,
                "navigationId": navigation_id,
            })),
        )
        .await
        .map(drop)
    }

    /// Take a screenshot and return the decoded image bytes. An empty
    /// `format` means "png".
    pub async fn capture_screenshot(
        &self,
        format: &str,
        quality: i64,
        from_surface: bool,
    ) -> Result<Vec<u8>> {
        let format = if format.is_empty() { "png" } else { format };

        let res = self
            .send_request(
                "Page.captureScreenshot",
                Some(json!({
                    "format": format,
                    "quality": quality,
                    "fromSurface": from_surface,
                })),
            )
            .await?;

        let data = res.string("data").ok_or(Error::NoResponse)?;
        Ok(STANDARD.decode(data)?)
    }

    /// Print the current page as PDF and return the decoded bytes.
    pub async fn print_to_pdf(&self, options: PrintToPdfOptions) -> Result<Vec<u8>> {
        let res = self
            .send_request("Page.printToPDF", Some(serde_json::to_value(&options)?))
            .await?;

        let data = res.string("data").ok_or(Error::NoResponse)?;
        Ok(STANDARD.decode(data)?)
    }

    /// Configure download handling; `download_path` applies to the `Allow`
    /// and `AllowAndName` behaviors.
    pub async fn set_download_behavior(
        &self,
        behavior: DownloadBehavior,
        download_path: Option<&str>,
    ) -> Result<()> {
        let mut params = json!({ "behavior": behavior });
        if let Some(path) = download_path {
            params["downloadPath"] = json!(path);
        }

        self.send_request("Page.setDownloadBehavior", Some(params))
            .await
            .map(drop)
    }

    /// Accept or dismiss a JavaScript-initiated dialog; `prompt_text`
    /// answers a prompt().
    pub async fn handle_javascript_dialog(&self, accept: bool, prompt_text: &str) -> Result<()> {
        self.send_request(
            "Page.handleJavaScriptDialog",
            Some(json!({
                "accept": accept,
                "promptText": prompt_text,
            })),
        )
        .await
        .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_options_skip_unset_fields() {
        let options = PrintToPdfOptions {
            landscape: Some(true),
            scale: Some(0.5),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            serde_json::json!({"landscape": true, "scale": 0.5})
        );

        assert_eq!(
            serde_json::to_value(PrintToPdfOptions::default()).unwrap(),
            serde_json::json!({})
        );
    }

    #[test]
    fn download_behavior_wire_names() {
        for (behavior, wire) in [
            (DownloadBehavior::Allow, "allow"),
            (DownloadBehavior::AllowAndName, "allowAndName"),
            (DownloadBehavior::Deny, "deny"),
            (DownloadBehavior::Default, "default"),
        ] {
            assert_eq!(serde_json::to_value(behavior).unwrap(), wire);
        }
    }

    #[test]
    fn navigation_response_wire_names() {
        assert_eq!(
            serde_json::to_value(NavigationResponse::CancelAndIgnore).unwrap(),
            "CancelAndIgnore"
        );
    }

    #[test]
    fn navigation_entry_accepts_float_id() {
        let entry: NavigationEntry =
            serde_json::from_str(r#"{"id": 3.0, "url": "about:blank", "title": ""}"#).unwrap();
        assert_eq!(entry.id, 3);
    }
}
