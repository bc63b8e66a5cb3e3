//! Visibility evaluation.

use serde::Deserialize;
use tracing::trace;

use crate::driver::ElementHandle;
use crate::error::DriverError;
use crate::scripts::STYLE_PROBE;

/// Visibility and size of one element at one instant. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingInfo {
    pub is_visible: bool,
    pub width: f64,
    pub height: f64,
}

impl BoundingInfo {
    /// The answer for detached, box-less or unreadable elements.
    pub fn hidden() -> Self {
        Self {
            is_visible: false,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Visible and at least `min_size` in both dimensions.
    pub fn qualifies(&self, min_size: f64) -> bool {
        self.is_visible && self.width >= min_size && self.height >= min_size
    }
}

/// Computed style as returned by [`STYLE_PROBE`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProbe {
    pub display: String,
    pub visibility: String,
    pub opacity: String,
    pub content_width: f64,
    pub content_height: f64,
}

impl StyleProbe {
    /// Style-level visibility: shown, not hidden, not transparent, not empty.
    pub fn is_rendered(&self) -> bool {
        let opaque = self
            .opacity
            .trim()
            .parse::<f64>()
            .map(|o| o > 0.0)
            .unwrap_or(false);

        self.display != "none"
            && self.visibility != "hidden"
            && opaque
            && self.content_width > 0.0
            && self.content_height > 0.0
    }
}

/// Determines whether elements are rendered and large enough to matter.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityEvaluator {
    min_size: f64,
}

impl VisibilityEvaluator {
    pub fn new(min_size: f64) -> Self {
        Self { min_size }
    }

    /// Evaluate `element`. Failures are absorbed into [`BoundingInfo::hidden`].
    pub async fn evaluate(&self, element: &dyn ElementHandle) -> BoundingInfo {
        match Self::probe(element).await {
            Ok(info) => info,
            Err(e) => {
                trace!("Visibility probe failed, treating as hidden: {}", e);
                BoundingInfo::hidden()
            }
        }
    }

    /// Evaluate and apply the minimum size in one step.
    pub async fn qualifies(&self, element: &dyn ElementHandle) -> bool {
        self.evaluate(element).await.qualifies(self.min_size)
    }

    async fn probe(element: &dyn ElementHandle) -> Result<BoundingInfo, DriverError> {
        let Some(bbox) = element.bounding_box().await? else {
            return Ok(BoundingInfo::hidden());
        };

        let style: StyleProbe = serde_json::from_value(element.evaluate(STYLE_PROBE).await?)?;
        if !style.is_rendered() {
            return Ok(BoundingInfo::hidden());
        }

        Ok(BoundingInfo {
            is_visible: true,
            width: bbox.width,
            height: bbox.height,
        })
    }
}

#[cfg(test)]
#[path = "visibility_tests.rs"]
mod tests;
