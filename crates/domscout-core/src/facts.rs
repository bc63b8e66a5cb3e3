//! Element facts gathered in a single script round trip.

use serde::{Deserialize, Serialize};

use crate::driver::ElementHandle;
use crate::error::DriverError;
use crate::scripts::FACTS_PROBE;

/// Attributes, text and position of one element, as seen by [`FACTS_PROBE`].
///
/// Locator and name rules are pure functions over this record, so they can be
/// exercised without a browser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementFacts {
    /// Lowercased tag name.
    pub tag: String,
    pub id: Option<String>,
    /// `data-testid`.
    pub test_id: Option<String>,
    /// `data-test-id`, the legacy spelling.
    pub legacy_test_id: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub r#type: Option<String>,
    pub title: Option<String>,
    pub aria_label: Option<String>,
    pub placeholder: Option<String>,
    pub alt: Option<String>,
    /// The `class` attribute split on single spaces, unfiltered.
    pub classes: Vec<String>,
    /// Elements in the owning document sharing this element's id.
    pub id_count: usize,
    /// Rendered text of a `<label for=...>` pointing at this element.
    pub label_text: Option<String>,
    /// Rendered text of the parent, when the parent is a `<label>`.
    pub parent_label_text: Option<String>,
    /// The element's own rendered text, trimmed.
    pub text: String,
    /// 1-based position among same-tag siblings; `None` without a parent.
    pub same_tag_index: Option<usize>,
}

impl ElementFacts {
    /// Run [`FACTS_PROBE`] against `element`.
    pub async fn collect(element: &dyn ElementHandle) -> Result<Self, DriverError> {
        let value = element.evaluate(FACTS_PROBE).await?;
        if value.is_null() {
            return Err(DriverError::Script("facts probe returned nothing".to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Class tokens usable in a selector: non-empty, no embedded whitespace.
    pub fn selector_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .map(String::as_str)
            .filter(|c| !c.is_empty() && !c.contains(char::is_whitespace))
    }

    /// The first class token, for display purposes.
    pub fn first_class(&self) -> Option<&str> {
        self.classes
            .iter()
            .flat_map(|c| c.split_whitespace())
            .next()
    }

    /// Whether this element can host a nested document.
    pub fn embeds_frame(&self) -> bool {
        matches!(self.tag.as_str(), "iframe" | "frame")
    }
}
