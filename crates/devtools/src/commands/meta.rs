//! Schema introspection, per-domain event enablement, browser shutdown.

use serde::Deserialize;
use tracing::warn;

use crate::discovery::Domain;
use crate::error::Result;
use crate::session::RemoteDebugger;

impl RemoteDebugger {
    /// List the protocol domains the peer supports.
    pub async fn get_domains(&self) -> Result<Vec<Domain>> {
        let raw = self.send_raw_request("Schema.getDomains", None).await?;

        #[derive(Deserialize)]
        struct Reply {
            #[serde(default)]
            domains: Vec<Domain>,
        }

        let reply: Reply = serde_json::from_slice(&raw)?;
        Ok(reply.domains)
    }

    /// Enable or disable event delivery for one domain.
    pub async fn domain_events(&self, domain: &str, enable: bool) -> Result<()> {
        let method = format!("{domain}.{}", if enable { "enable" } else { "disable" });
        self.send_request(&method, None).await.map(drop)
    }

    /// Enable or disable event delivery for every discovered domain. Domains
    /// are toggled in order; the first failure stops the walk.
    pub async fn all_events(&self, enable: bool) -> Result<()> {
        for domain in self.get_domains().await? {
            self.domain_events(&domain.name, enable).await?;
        }
        Ok(())
    }

    pub async fn dom_events(&self, enable: bool) -> Result<()> {
        self.domain_events("DOM", enable).await
    }

    pub async fn page_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Page", enable).await
    }

    pub async fn network_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Network", enable).await
    }

    pub async fn runtime_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Runtime", enable).await
    }

    pub async fn log_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Log", enable).await
    }

    pub async fn profiler_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Profiler", enable).await
    }

    pub async fn emulation_events(&self, enable: bool) -> Result<()> {
        self.domain_events("Emulation", enable).await
    }

    pub async fn service_worker_events(&self, enable: bool) -> Result<()> {
        self.domain_events("ServiceWorker", enable).await
    }

    /// Ask the browser to shut down. No typed reply is expected; a failure
    /// is logged, not returned, since the peer usually dies mid-answer.
    pub async fn close_browser(&self) {
        if let Err(err) = self.send_request("Browser.close", None).await {
            warn!("close browser: {err}");
        }
    }
}
