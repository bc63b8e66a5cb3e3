//! Locator generation.
//!
//! Attribute-based selectors come first because they survive layout changes
//! and DOM reordering. The structural fallback is a last resort and may stay
//! ambiguous.

use tracing::trace;

use crate::css::{attribute_equals, escape_ident};
use crate::driver::{ElementHandle, FrameContext};
use crate::error::DriverError;
use crate::facts::ElementFacts;

/// One step of the locator priority chain.
pub struct LocatorRule {
    /// Rule name, for logs and tests.
    pub name: &'static str,
    /// Produce a selector, or `None` to fall through to the next rule.
    pub build: fn(&ElementFacts) -> Option<String>,
}

/// Attribute rules in priority order. The structural fallback runs after these.
pub const LOCATOR_RULES: &[LocatorRule] = &[
    LocatorRule { name: "unique-id", build: unique_id },
    LocatorRule { name: "data-testid", build: test_id },
    LocatorRule { name: "data-test-id", build: legacy_test_id },
    LocatorRule { name: "name", build: name_attribute },
];

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn unique_id(facts: &ElementFacts) -> Option<String> {
    let id = non_empty(&facts.id)?;
    (facts.id_count == 1).then(|| format!("#{}", escape_ident(id)))
}

fn test_id(facts: &ElementFacts) -> Option<String> {
    non_empty(&facts.test_id).map(|v| attribute_equals("data-testid", v))
}

fn legacy_test_id(facts: &ElementFacts) -> Option<String> {
    non_empty(&facts.legacy_test_id).map(|v| attribute_equals("data-test-id", v))
}

fn name_attribute(facts: &ElementFacts) -> Option<String> {
    non_empty(&facts.name).map(|v| attribute_equals("name", v))
}

/// Tag, single-token classes, then `role` and `type` fragments.
pub fn structural_selector(facts: &ElementFacts) -> String {
    let mut selector = facts.tag.to_lowercase();
    for class in facts.selector_classes() {
        selector.push('.');
        selector.push_str(&escape_ident(class));
    }
    if let Some(role) = facts.role.as_deref() {
        selector.push_str(&attribute_equals("role", role));
    }
    if let Some(kind) = facts.r#type.as_deref() {
        selector.push_str(&attribute_equals("type", kind));
    }
    selector
}

/// First matching attribute rule, with the name of the rule that fired.
pub fn attribute_locator(facts: &ElementFacts) -> Option<(&'static str, String)> {
    LOCATOR_RULES
        .iter()
        .find_map(|rule| (rule.build)(facts).map(|selector| (rule.name, selector)))
}

/// Derives locator strings for elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorGenerator;

impl LocatorGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Locator for an element whose facts are already known.
    ///
    /// Only the structural fallback touches the document, to decide whether a
    /// positional index is needed.
    pub async fn from_facts(
        &self,
        facts: &ElementFacts,
        frame: &dyn FrameContext,
    ) -> Result<String, DriverError> {
        if facts.tag.is_empty() {
            return Err(DriverError::Script("element has no tag name".to_string()));
        }

        if let Some((rule, selector)) = attribute_locator(facts) {
            trace!("Locator rule '{}' matched: {}", rule, selector);
            return Ok(selector);
        }

        let selector = structural_selector(facts);
        if frame.count_matches(&selector).await? <= 1 {
            return Ok(selector);
        }

        match facts.same_tag_index {
            Some(index) => Ok(format!("{}:nth-of-type({})", selector, index)),
            None => Ok(selector),
        }
    }

    /// Locator for `element`, or `None` if anything along the way fails.
    pub async fn generate(
        &self,
        element: &dyn ElementHandle,
        frame: &dyn FrameContext,
    ) -> Option<String> {
        let result = match ElementFacts::collect(element).await {
            Ok(facts) => self.from_facts(&facts, frame).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(selector) => Some(selector),
            Err(e) => {
                trace!("Locator generation failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
