//! Discovery over the browser's `/json/*` HTTP surface.
//!
//! Independent of the debugging channel: tab listing and lifecycle go over
//! plain HTTP against `http://<host>:<port>`.

use reqwest::header::{HeaderValue, HOST};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::session::ConnectOptions;

/// DevTools version information from `/json/version`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Version {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "User-Agent", default)]
    pub user_agent: String,
    #[serde(rename = "V8-Version", default)]
    pub v8_version: String,
    #[serde(rename = "WebKit-Version", default)]
    pub webkit_version: String,
}

/// A protocol domain name and version, from `Schema.getDomains`.
#[derive(Debug, Clone, Deserialize)]
pub struct Domain {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// An opened tab/page. Immutable once observed; refresh by re-listing.
///
/// Tabs are ordered by activity time (most recently used first), so the
/// current tab is the first one of type "page".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tab {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub ws_url: String,
    #[serde(rename = "devtoolsFrontendUrl", default)]
    pub devtools_url: String,
}

pub(crate) struct Discovery {
    client: reqwest::Client,
    base_url: String,
}

impl Discovery {
    pub(crate) fn new(addr: &str, options: &ConnectOptions) -> Result<Self> {
        let mut headers = options.headers.clone();
        if let Some(host) = &options.host_header {
            match HeaderValue::from_str(host) {
                Ok(value) => {
                    headers.insert(HOST, value);
                }
                Err(_) => warn!("invalid host header {host:?}, ignored"),
            }
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: format!("http://{addr}"),
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        Ok(response)
    }

    pub(crate) async fn version(&self) -> Result<Version> {
        Ok(self.get("/json/version").await?.json().await?)
    }

    /// The protocol schema document, passed through undecoded.
    pub(crate) async fn protocol(&self) -> Result<Value> {
        Ok(self.get("/json/protocol").await?.json().await?)
    }

    pub(crate) async fn tab_list(&self, filter: Option<&str>) -> Result<Vec<Tab>> {
        let tabs: Vec<Tab> = self.get("/json/list").await?.json().await?;

        Ok(match filter {
            None => tabs,
            Some(kind) => tabs.into_iter().filter(|t| t.kind == kind).collect(),
        })
    }

    pub(crate) async fn new_tab(&self, url: Option<&str>) -> Result<Tab> {
        let path = match url {
            Some(url) if !url.is_empty() => format!("/json/new?{url}"),
            _ => "/json/new".to_owned(),
        };

        Ok(self.get(&path).await?.json().await?)
    }

    pub(crate) async fn activate(&self, id: &str) -> Result<()> {
        self.get(&format!("/json/activate/{id}")).await.map(drop)
    }

    pub(crate) async fn close_tab(&self, id: &str) -> Result<()> {
        self.get(&format!("/json/close/{id}")).await.map(drop)
    }
}
