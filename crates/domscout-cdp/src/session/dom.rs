//! DOM operations for CDP page session.

use serde_json::{json, Value};

use crate::error::CdpError;
use crate::protocol::{BoxModel, DomNode, RemoteObject};

use super::core::PageSession;

/// Node ids from a `nodeIds` array, skipping the zero placeholder CDP uses
/// for nodes it could not push.
pub(super) fn node_ids(result: &Value) -> Vec<i64> {
    result["nodeIds"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_i64()).filter(|id| *id != 0).collect())
        .unwrap_or_default()
}

impl PageSession {
    /// Fetch the whole document tree, including same-process frame documents.
    ///
    /// Invalidates node ids handed out before the call.
    pub async fn get_document(&self) -> Result<DomNode, CdpError> {
        let result = self
            .call(
                "DOM.getDocument",
                Some(json!({"depth": -1, "pierce": true})),
            )
            .await?;

        let root: DomNode = serde_json::from_value(result["root"].clone())?;
        Ok(root)
    }

    /// `querySelectorAll` scoped to the node `root` (usually a document).
    pub async fn query_selector_all_in(
        &self,
        root: i64,
        selector: &str,
    ) -> Result<Vec<i64>, CdpError> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({
                    "nodeId": root,
                    "selector": selector,
                })),
            )
            .await?;

        Ok(node_ids(&result))
    }

    /// Get box model for node; `None` when the node has no layout box.
    pub async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            Err(CdpError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Describe a node without tracking it. `depth` 1 with `pierce` includes
    /// a frame element's content document.
    pub async fn describe_node(&self, node_id: i64, depth: i64) -> Result<DomNode, CdpError> {
        let result = self
            .call(
                "DOM.describeNode",
                Some(json!({"nodeId": node_id, "depth": depth, "pierce": true})),
            )
            .await?;

        let node: DomNode = serde_json::from_value(result["node"].clone())?;
        Ok(node)
    }

    /// Start tracking nodes known only by backend id.
    pub async fn push_nodes_by_backend_ids(&self, backend_ids: &[i64]) -> Result<Vec<i64>, CdpError> {
        let result = self
            .call(
                "DOM.pushNodesByBackendIdsToFrontend",
                Some(json!({"backendNodeIds": backend_ids})),
            )
            .await?;

        Ok(node_ids(&result))
    }

    /// Resolve node to a runtime object in `group`.
    pub async fn resolve_node(&self, node_id: i64, group: &str) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "DOM.resolveNode",
                Some(json!({"nodeId": node_id, "objectGroup": group})),
            )
            .await?;

        let obj: RemoteObject = serde_json::from_value(result["object"].clone())?;
        Ok(obj)
    }

    /// Node id for a runtime object that refers to a DOM node.
    pub async fn request_node(&self, object_id: &str) -> Result<Option<i64>, CdpError> {
        let result = self
            .call("DOM.requestNode", Some(json!({"objectId": object_id})))
            .await?;

        Ok(result["nodeId"].as_i64().filter(|id| *id != 0))
    }
}
