use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

/// Tracker-agnostic representation of one board card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCard {
    pub summary: String,
    /// Leading `(n)` annotation from the card name; `None` when the card has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_points: Option<f64>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_link: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Checklist name to item names, in attach order.
    #[serde(default)]
    pub details: IndexMap<String, Vec<String>>,
}

impl NormalizedCard {
    /// True when the pattern matches the summary, description, a checklist item or a label.
    pub fn matches_content(&self, pattern: &Pattern) -> bool {
        pattern.is_match(&self.summary)
            || pattern.is_match(&self.description)
            || self
                .details
                .iter()
                .any(|(name, items)| pattern.is_match(name) || items.iter().any(|i| pattern.is_match(i)))
            || self.labels.iter().any(|l| pattern.is_match(l))
    }
}
