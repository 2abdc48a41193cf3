pub mod payload;

use futures::future::try_join_all;

use crate::error::TrackerError;
use crate::model::card::NormalizedCard;
use crate::model::tracker::TrackerIssue;
use crate::providers::IssueTracker;
use payload::{issue_payload, FieldIds};

const EPIC_TYPE: &str = "Epic";

/// Creates one issue per card under `epic_key`.
///
/// The epic and the tracker's fields are checked before anything is written. Creations
/// run concurrently; issues created before a failing one are left in place.
pub async fn create_issues(
    tracker: &dyn IssueTracker,
    epic_key: &str,
    cards: &[NormalizedCard],
    extra_labels: &[String],
) -> Result<Vec<TrackerIssue>, TrackerError> {
    tracing::info!("Fetching epic {epic_key} to act as template for issues");
    let epic = tracker.get_issue(epic_key).await?;
    if epic.fields.issuetype.name != EPIC_TYPE {
        return Err(TrackerError::EpicTypeMismatch {
            key: epic.key,
            issue_type: epic.fields.issuetype.name,
        });
    }

    let field_ids = FieldIds::resolve(&tracker.list_fields().await?)?;

    let payloads: Vec<_> = cards
        .iter()
        .map(|card| issue_payload(&epic, card, &field_ids, extra_labels))
        .collect();
    tracing::debug!(count = payloads.len(), epic = %epic.key, "Creating issues");

    let created = try_join_all(payloads.iter().map(|p| tracker.create_issue(p))).await?;

    Ok(created
        .into_iter()
        .map(|c| TrackerIssue {
            key: c.key,
            epic: epic.key.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::tests::MockTracker;

    fn card(summary: &str) -> NormalizedCard {
        NormalizedCard {
            summary: summary.into(),
            story_points: None,
            description: String::new(),
            card_link: None,
            labels: vec![],
            details: Default::default(),
        }
    }

    #[tokio::test]
    async fn creates_one_issue_per_card() {
        let tracker = MockTracker::new("Epic");
        let issues = create_issues(&tracker, "PROJ-1", &[card("a"), card("b")], &[])
            .await
            .unwrap();

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.epic == "PROJ-1"));
        let created = tracker.created();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0]["fields"]["customfield_10"], "PROJ-1");
    }

    #[tokio::test]
    async fn non_epic_parent_creates_nothing() {
        let tracker = MockTracker::new("Story");
        let err = create_issues(&tracker, "PROJ-1", &[card("a")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::EpicTypeMismatch { .. }));
        assert!(tracker.created().is_empty());
    }

    #[tokio::test]
    async fn epic_type_name_must_match_exactly() {
        let tracker = MockTracker::new("epic");
        let err = create_issues(&tracker, "PROJ-1", &[card("a")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::EpicTypeMismatch { .. }));
        assert_eq!(tracker.calls(), 1);
        assert!(tracker.created().is_empty());
    }

    #[tokio::test]
    async fn missing_epic_link_field_creates_nothing() {
        let tracker = MockTracker::new("Epic").without_epic_link();
        let err = create_issues(&tracker, "PROJ-1", &[card("a")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::MissingCapability { .. }));
        assert!(tracker.created().is_empty());
    }

    #[tokio::test]
    async fn failed_creation_does_not_roll_back_others() {
        let tracker = MockTracker::new("Epic").failing_on("b");
        let err = create_issues(&tracker, "PROJ-1", &[card("a"), card("b")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Fetch(_)));
        let created = tracker.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0]["fields"]["summary"], "a");
    }

    #[tokio::test]
    async fn no_cards_still_validates_epic() {
        let tracker = MockTracker::new("Story");
        assert!(create_issues(&tracker, "PROJ-1", &[], &[]).await.is_err());
    }
}
