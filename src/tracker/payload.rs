use serde_json::{json, Map, Value};

use crate::error::TrackerError;
use crate::model::card::NormalizedCard;
use crate::model::tracker::{FieldDefinition, Issue};

pub const EPIC_LINK_FIELD: &str = "Epic Link";
pub const STORY_POINTS_FIELD: &str = "Story Points";
const ISSUE_TYPE: &str = "Task";

/// Ids of the custom fields an issue payload refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIds {
    pub epic_link: String,
    pub story_points: Option<String>,
}

impl FieldIds {
    /// Looks fields up by display name. The epic link is required, story points are optional.
    pub fn resolve(fields: &[FieldDefinition]) -> Result<Self, TrackerError> {
        let find = |name: &str| {
            fields
                .iter()
                .filter(|f| f.custom)
                .find(|f| f.name.eq_ignore_ascii_case(name))
                .map(|f| f.id.clone())
        };

        let epic_link = find(EPIC_LINK_FIELD).ok_or_else(|| TrackerError::MissingCapability {
            field: EPIC_LINK_FIELD.to_string(),
        })?;
        let story_points = find(STORY_POINTS_FIELD);
        if story_points.is_none() {
            tracing::warn!("No '{STORY_POINTS_FIELD}' field, story points will not be synced");
        }

        Ok(Self {
            epic_link,
            story_points,
        })
    }
}

/// Issue description: the card text, a link back to the card and one section per checklist.
pub fn description(card: &NormalizedCard) -> String {
    let mut out = card.description.clone();
    if let Some(link) = &card.card_link {
        out.push_str(&format!("\n[Trello link|{link}]"));
    }
    for (name, items) in &card.details {
        out.push_str(&format!("\nh3. {name}"));
        for (i, item) in items.iter().enumerate() {
            out.push_str(&format!("\n{}. {item}", i + 1));
        }
    }
    out
}

/// Create-issue payload for `card`, placed in the epic's project and fix versions.
pub fn issue_payload(
    epic: &Issue,
    card: &NormalizedCard,
    field_ids: &FieldIds,
    extra_labels: &[String],
) -> Value {
    let labels: Vec<&str> = extra_labels
        .iter()
        .chain(card.labels.iter())
        .map(String::as_str)
        .collect();

    let mut fields = Map::new();
    fields.insert("issuetype".into(), json!({ "name": ISSUE_TYPE }));
    fields.insert("project".into(), json!({ "id": epic.fields.project.id }));
    fields.insert("summary".into(), json!(card.summary));
    fields.insert("description".into(), json!(description(card)));
    fields.insert("fixVersions".into(), json!(epic.fields.fix_versions));
    fields.insert("labels".into(), json!(labels));
    fields.insert(field_ids.epic_link.clone(), json!(epic.key));
    if let (Some(field), Some(points)) = (&field_ids.story_points, card.story_points) {
        fields.insert(field.clone(), json!(points));
    }

    json!({ "fields": fields })
}
