//! Human-readable element names.

use crate::facts::ElementFacts;

/// One step of the name priority chain.
pub struct NameRule {
    pub name: &'static str,
    pub extract: fn(&ElementFacts) -> Option<&str>,
}

/// Content rules in priority order. The tag-based fallback runs after these.
pub const NAME_RULES: &[NameRule] = &[
    NameRule { name: "label-for", extract: label_for },
    NameRule { name: "parent-label", extract: parent_label },
    NameRule { name: "title", extract: title },
    NameRule { name: "aria-label", extract: aria_label },
    NameRule { name: "placeholder", extract: placeholder },
    NameRule { name: "alt", extract: alt },
    NameRule { name: "text", extract: own_text },
];

fn label_for(facts: &ElementFacts) -> Option<&str> {
    facts.label_text.as_deref()
}

fn parent_label(facts: &ElementFacts) -> Option<&str> {
    facts.parent_label_text.as_deref()
}

fn title(facts: &ElementFacts) -> Option<&str> {
    facts.title.as_deref()
}

fn aria_label(facts: &ElementFacts) -> Option<&str> {
    facts.aria_label.as_deref()
}

fn placeholder(facts: &ElementFacts) -> Option<&str> {
    facts.placeholder.as_deref()
}

fn alt(facts: &ElementFacts) -> Option<&str> {
    facts.alt.as_deref()
}

fn own_text(facts: &ElementFacts) -> Option<&str> {
    Some(facts.text.as_str())
}

/// Derives names, bounded to a maximum number of characters.
#[derive(Debug, Clone, Copy)]
pub struct NameExtractor {
    max_length: usize,
}

impl NameExtractor {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Name for the element described by `facts`. Never empty-handed: falls
    /// back to the tag name.
    pub fn extract(&self, facts: &ElementFacts) -> String {
        NAME_RULES
            .iter()
            .filter_map(|rule| (rule.extract)(facts))
            .map(|candidate| self.clean(candidate))
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_else(|| self.clean(&fallback(facts)))
    }

    /// Trim, then truncate on a character boundary. Inner whitespace is kept.
    pub fn clean(&self, raw: &str) -> String {
        raw.trim().chars().take(self.max_length).collect()
    }
}

fn fallback(facts: &ElementFacts) -> String {
    let tag = facts.tag.to_lowercase();
    if let Some(id) = facts.id.as_deref().filter(|id| !id.is_empty()) {
        format!("{} (ID: {})", tag, id)
    } else if let Some(class) = facts.first_class() {
        format!("{} (Class: {})", tag, class)
    } else {
        tag
    }
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
