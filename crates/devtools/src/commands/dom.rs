//! DOM and CSS domains: queries and mutation against DevTool nodes.

use serde_json::json;

use crate::error::{Error, Result};
use crate::protocol::Params;
use crate::session::RemoteDebugger;

/// Which kind of node identifier `set_file_input_files` receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdType {
    NodeId,
    BackendNodeId,
    ObjectId,
}

impl RemoteDebugger {
    /// The "Document" object, as a DevTool node.
    pub async fn get_document(&self) -> Result<Params> {
        self.send_request("DOM.getDocument", None).await
    }

    /// The nodeId matching `selector` under `node_id`.
    pub async fn query_selector(&self, node_id: i64, selector: &str) -> Result<Params> {
        self.send_request(
            "DOM.querySelector",
            Some(json!({
                "nodeId": node_id,
                "selector": selector,
            })),
        )
        .await
    }

    /// All nodeIds matching `selector` under `node_id`.
    pub async fn query_selector_all(&self, node_id: i64, selector: &str) -> Result<Params> {
        self.send_request(
            "DOM.querySelectorAll",
            Some(json!({
                "nodeId": node_id,
                "selector": selector,
            })),
        )
        .await
    }

    /// Resolve a node into a Runtime object description.
    pub async fn resolve_node(&self, node_id: i64) -> Result<Params> {
        self.send_request("DOM.resolveNode", Some(json!({ "nodeId": node_id })))
            .await
    }

    /// Request a node's children; the answer arrives as a
    /// `DOM.setChildNodes` event.
    pub async fn request_node(&self, node_id: i64) -> Result<()> {
        self.send_request("DOM.requestChildNodes", Some(json!({ "nodeId": node_id })))
            .await
            .map(drop)
    }

    /// Focus a node.
    pub async fn focus(&self, node_id: i64) -> Result<()> {
        self.send_request("DOM.focus", Some(json!({ "nodeId": node_id })))
            .await
            .map(drop)
    }

    /// Attach files to a file input element, addressed by the id kind of
    /// your choosing.
    pub async fn set_file_input_files(
        &self,
        id: i64,
        files: &[&str],
        id_type: IdType,
    ) -> Result<()> {
        let mut params = json!({ "files": files });

        let key = match id_type {
            IdType::NodeId => "nodeId",
            IdType::BackendNodeId => "backendNodeId",
            IdType::ObjectId => "objectId",
        };
        params[key] = json!(id);

        self.send_request("DOM.setFileInputFiles", Some(params))
            .await
            .map(drop)
    }

    /// Set the value of a node's attribute.
    pub async fn set_attribute_value(&self, node_id: i64, name: &str, value: &str) -> Result<()> {
        self.send_request(
            "DOM.setAttributeValue",
            Some(json!({
                "nodeId": node_id,
                "name": name,
                "value": value,
            })),
        )
        .await
        .map(drop)
    }

    /// A node's HTML markup.
    pub async fn get_outer_html(&self, node_id: i64) -> Result<String> {
        let res = self
            .send_request("DOM.getOuterHTML", Some(json!({ "nodeId": node_id })))
            .await?;

        res.string("outerHTML")
            .map(str::to_owned)
            .ok_or(Error::NoResponse)
    }

    /// Replace a node's HTML markup.
    pub async fn set_outer_html(&self, node_id: i64, outer_html: &str) -> Result<()> {
        self.send_request(
            "DOM.setOuterHTML",
            Some(json!({
                "nodeId": node_id,
                "outerHTML": outer_html,
            })),
        )
        .await
        .map(drop)
    }

    /// Box model for a node.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Params> {
        self.send_request("DOM.getBoxModel", Some(json!({ "nodeId": node_id })))
            .await
    }

    /// Computed style for a node.
    pub async fn get_computed_style_for_node(&self, node_id: i64) -> Result<Params> {
        self.send_request(
            "CSS.getComputedStyleForNode",
            Some(json!({ "nodeId": node_id })),
        )
        .await
    }
}
