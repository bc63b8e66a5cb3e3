//! Discovery driver over a CDP page session.
//!
//! Each pass starts with a fresh `DOM.getDocument`, so node ids are only valid
//! for the pass that produced them. Remote objects are created in
//! [`OBJECT_GROUP`] and released in bulk when the next pass begins.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domscout_core::{BoundingBox, DriverError, ElementHandle, FrameContext, RootSource};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::{document_error, CdpError};
use crate::protocol::DomNode;
use crate::session::PageSession;

/// Object group for every remote object the driver creates.
pub const OBJECT_GROUP: &str = "domscout";

const PARENT_ELEMENT: &str = "function() { return this.parentElement; }";

#[derive(Debug, Clone, PartialEq)]
struct FrameEntry {
    document: i64,
    label: String,
}

/// Frame element node id → its content document.
type FrameMap = Arc<RwLock<HashMap<i64, FrameEntry>>>;

fn document_label(doc: &DomNode) -> String {
    doc.document_url
        .clone()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| format!("document {}", doc.node_id))
}

/// Index every same-process frame document in the tree.
fn collect_frames(root: &DomNode) -> HashMap<i64, FrameEntry> {
    let mut frames = HashMap::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if let Some(doc) = node.content_document.as_deref() {
            frames.insert(
                node.node_id,
                FrameEntry {
                    document: doc.node_id,
                    label: document_label(doc),
                },
            );
            stack.push(doc);
        }
        if let Some(children) = &node.children {
            stack.extend(children.iter());
        }
        if let Some(roots) = &node.shadow_roots {
            stack.extend(roots.iter());
        }
    }

    frames
}

/// Axis-aligned bounds of a CDP quad.
pub(crate) fn quad_bounds(quad: &[f64]) -> Option<BoundingBox> {
    if quad.len() < 8 {
        return None;
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for point in quad[..8].chunks_exact(2) {
        min_x = min_x.min(point[0]);
        max_x = max_x.max(point[0]);
        min_y = min_y.min(point[1]);
        max_y = max_y.max(point[1]);
    }
    Some(BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    })
}

/// The page's current main document, re-fetched for every pass.
pub struct CdpRoot {
    session: Arc<PageSession>,
}

impl CdpRoot {
    pub fn new(session: Arc<PageSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RootSource for CdpRoot {
    async fn root(&self) -> Result<Arc<dyn FrameContext>, DriverError> {
        if let Err(e) = self.session.release_object_group(OBJECT_GROUP).await {
            trace!("Releasing object group failed: {}", e);
        }

        let document = self.session.get_document().await.map_err(document_error)?;
        let frames = collect_frames(&document);
        trace!("Document {} has {} frame(s)", document.node_id, frames.len());

        Ok(Arc::new(CdpFrame {
            session: self.session.clone(),
            document: document.node_id,
            label: document_label(&document),
            frames: Arc::new(RwLock::new(frames)),
        }))
    }
}

/// A document (main or nested) addressed by its node id.
pub struct CdpFrame {
    session: Arc<PageSession>,
    document: i64,
    label: String,
    frames: FrameMap,
}

#[async_trait]
impl FrameContext for CdpFrame {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError> {
        let ids = self
            .session
            .query_selector_all_in(self.document, selector)
            .await
            .map_err(document_error)?;

        Ok(ids
            .into_iter()
            .map(|node_id| {
                Box::new(CdpElement::new(self.session.clone(), node_id, self.frames.clone()))
                    as Box<dyn ElementHandle>
            })
            .collect())
    }

    async fn count_matches(&self, selector: &str) -> Result<usize, DriverError> {
        let ids = self
            .session
            .query_selector_all_in(self.document, selector)
            .await
            .map_err(document_error)?;
        Ok(ids.len())
    }
}

/// An element node; the remote object is resolved on first script use.
pub struct CdpElement {
    session: Arc<PageSession>,
    node_id: i64,
    frames: FrameMap,
    object_id: OnceCell<String>,
}

impl CdpElement {
    fn new(session: Arc<PageSession>, node_id: i64, frames: FrameMap) -> Self {
        Self {
            session,
            node_id,
            frames,
            object_id: OnceCell::new(),
        }
    }

    async fn object_id(&self) -> Result<&str, DriverError> {
        let id = self
            .object_id
            .get_or_try_init(|| async {
                let object = self.session.resolve_node(self.node_id, OBJECT_GROUP).await?;
                object.object_id.ok_or_else(|| {
                    CdpError::InvalidResponse(format!("node {} has no remote object", self.node_id))
                })
            })
            .await?;
        Ok(id.as_str())
    }

    /// Frame document created after the pass's `getDocument`.
    async fn late_frame(&self) -> Result<Option<FrameEntry>, CdpError> {
        let node = self.session.describe_node(self.node_id, 1).await?;
        let Some(doc) = node.content_document else {
            return Ok(None);
        };

        let ids = self
            .session
            .push_nodes_by_backend_ids(&[doc.backend_node_id])
            .await?;
        Ok(ids.first().map(|&document| FrameEntry {
            document,
            label: document_label(&doc),
        }))
    }
}

#[async_trait]
impl ElementHandle for CdpElement {
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, DriverError> {
        let model = self.session.get_box_model(self.node_id).await?;
        Ok(model.and_then(|m| quad_bounds(&m.border)))
    }

    async fn evaluate(&self, function: &str) -> Result<Value, DriverError> {
        let object_id = self.object_id().await?;
        Ok(self
            .session
            .call_function_on(object_id, function, None)
            .await?)
    }

    async fn parent(&self) -> Result<Option<Box<dyn ElementHandle>>, DriverError> {
        let object_id = self.object_id().await?;
        let parent = self
            .session
            .call_function_on_handle(object_id, PARENT_ELEMENT)
            .await?;
        let Some(parent_object) = parent.object_id else {
            return Ok(None);
        };

        let Some(node_id) = self.session.request_node(&parent_object).await? else {
            return Ok(None);
        };

        let element = CdpElement {
            session: self.session.clone(),
            node_id,
            frames: self.frames.clone(),
            object_id: OnceCell::new_with(Some(parent_object)),
        };
        Ok(Some(Box::new(element)))
    }

    async fn content_frame(&self) -> Result<Option<Arc<dyn FrameContext>>, DriverError> {
        let known = self.frames.read().get(&self.node_id).cloned();
        let entry = match known {
            Some(entry) => Some(entry),
            None => {
                let late = self.late_frame().await?;
                if let Some(entry) = &late {
                    self.frames.write().insert(self.node_id, entry.clone());
                }
                late
            }
        };

        Ok(entry.map(|entry| {
            Arc::new(CdpFrame {
                session: self.session.clone(),
                document: entry.document,
                label: entry.label,
                frames: self.frames.clone(),
            }) as Arc<dyn FrameContext>
        }))
    }

    async fn dispose(&self) -> Result<(), DriverError> {
        if let Some(object_id) = self.object_id.get() {
            self.session.release_object(object_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
