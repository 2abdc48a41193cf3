use std::sync::LazyLock;

use regex::Regex;

use crate::model::card::NormalizedCard;
use crate::model::trello::RawCard;

static STORY_POINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((\d+(\.\d+)?)\)\s*(.*)$").expect("story point pattern is valid")
});

/// Splits a leading `(n)` story point annotation off a card name.
pub fn split_story_points(name: &str) -> (Option<f64>, &str) {
    let Some(caps) = STORY_POINTS.captures(name) else {
        return (None, name);
    };
    let points = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
    match (points, caps.get(3)) {
        (Some(points), Some(rest)) => (Some(points), rest.as_str()),
        _ => (None, name),
    }
}

/// Maps a card and its merged checklists to a [`NormalizedCard`]. Pure.
pub fn normalize_card(card: &RawCard) -> NormalizedCard {
    let (story_points, summary) = split_story_points(&card.name);

    let details = card
        .checklists
        .iter()
        .map(|(name, checklist)| {
            let items = checklist.check_items.iter().map(|i| i.name.clone()).collect();
            (name.clone(), items)
        })
        .collect();

    NormalizedCard {
        summary: summary.to_string(),
        story_points,
        description: card.desc.clone().unwrap_or_default(),
        card_link: card.short_url.clone(),
        labels: card.labels.iter().map(|l| l.name.clone()).collect(),
        details,
    }
}
