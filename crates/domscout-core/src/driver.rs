//! The seam between the discovery algorithm and a rendering engine.
//!
//! A driver supplies three things: documents/frames that can be queried with
//! CSS selectors ([`FrameContext`]), handles to live elements
//! ([`ElementHandle`]), and a way to obtain the current root document for each
//! pass ([`RootSource`]). Everything is asynchronous; every call is a
//! suspension point while the engine answers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DriverError;

/// Border-box geometry of an element in its frame's viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A document or nested frame with its own element tree.
#[async_trait]
pub trait FrameContext: Send + Sync {
    /// Short description used in log lines (URL, frame id, ...).
    fn label(&self) -> String;

    /// All elements matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Box<dyn ElementHandle>>, DriverError>;

    /// Number of elements currently matching `selector`.
    async fn count_matches(&self, selector: &str) -> Result<usize, DriverError>;
}

/// A handle to one live element.
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Border-box geometry, or `None` when the element has no layout box.
    async fn bounding_box(&self) -> Result<Option<BoundingBox>, DriverError>;

    /// Run a JavaScript function declaration with the element bound to `this`
    /// and return its JSON-serializable result.
    async fn evaluate(&self, function: &str) -> Result<Value, DriverError>;

    /// The element's parent element, if any.
    async fn parent(&self) -> Result<Option<Box<dyn ElementHandle>>, DriverError>;

    /// The nested document when this element embeds a frame.
    async fn content_frame(&self) -> Result<Option<Arc<dyn FrameContext>>, DriverError>;

    /// Release engine-side resources held by this handle.
    async fn dispose(&self) -> Result<(), DriverError>;
}

/// Supplies the root document a pass should walk.
///
/// Called once per pass so that navigation, which replaces the document, is
/// picked up on the next pulse.
#[async_trait]
pub trait RootSource: Send + Sync {
    async fn root(&self) -> Result<Arc<dyn FrameContext>, DriverError>;
}
