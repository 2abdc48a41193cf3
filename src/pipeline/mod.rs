pub mod boards;
pub mod cards;
pub mod lists;
pub mod normalize;

use serde::Serialize;

use crate::error::{PipelineError, SyncError};
use crate::model::card::NormalizedCard;
use crate::model::tracker::TrackerIssue;
use crate::pattern::Patterns;
use crate::providers::{BoardSource, IssueTracker};

/// Where normalized cards go once collected.
pub enum SyncMode<'a> {
    /// Collect only, nothing is written to the tracker.
    Preview,
    Apply {
        tracker: &'a dyn IssueTracker,
        epic: &'a str,
        extra_labels: &'a [String],
    },
}

#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub cards: Vec<NormalizedCard>,
    pub issues: Vec<TrackerIssue>,
}

/// Boards, then lists, then cards, then normalization. Each stage waits for the
/// whole previous batch.
pub struct SyncPipeline<'a> {
    source: &'a dyn BoardSource,
}

impl<'a> SyncPipeline<'a> {
    pub fn new(source: &'a dyn BoardSource) -> Self {
        Self { source }
    }

    pub async fn collect(&self, patterns: &Patterns) -> Result<Vec<NormalizedCard>, PipelineError> {
        // Boards -> lists -> cards, each stage waits for the previous one
        let boards = boards::resolve_boards(self.source, &patterns.board).await?;
        let lists = lists::resolve_lists(self.source, &boards, &patterns.list).await?;
        let cards = cards::aggregate_cards(self.source, &lists, &patterns.card).await?;
        Ok(cards.iter().map(normalize::normalize_card).collect())
    }

    pub async fn sync(&self, patterns: &Patterns, mode: SyncMode<'_>) -> Result<SyncReport, SyncError> {
        let cards = self.collect(patterns).await?;

        let issues = match mode {
            SyncMode::Preview => {
                tracing::debug!("Would create {} issues", cards.len());
                Vec::new()
            }
            SyncMode::Apply {
                tracker,
                epic,
                extra_labels,
            } => {
                tracing::debug!("Will create {} issues", cards.len());
                crate::tracker::create_issues(tracker, epic, &cards, extra_labels).await?
            }
        };

        Ok(SyncReport { cards, issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::providers::tests::{checklist, MockBoardSource, MockTracker};

    fn source() -> MockBoardSource {
        MockBoardSource::new()
            .with_orgs(&["org1"])
            .with_boards("org1", &[("b1", "Sprint 42"), ("b2", "Backlog")])
            .with_lists("b1", &[("l1", "MUST PER RELEASE"), ("l2", "Done")])
            .with_lists("b2", &[("l3", "MUST PER BUILD")])
            .with_cards("l1", &[("c1", "(3) Fix login"), ("c2", "Write docs")])
            .with_cards("l3", &[("c3", "Backlog item")])
            .with_checklists("c1", &[checklist("c1", "Steps", &["repro", "fix"])])
    }

    fn patterns(board: &str) -> Patterns {
        Patterns::new(board, "MUST PER (RELEASE|BUILD)", ".*").unwrap()
    }

    #[tokio::test]
    async fn only_matching_board_reaches_list_stage() {
        let source = source();
        let cards = SyncPipeline::new(&source)
            .collect(&patterns("Sprint.*"))
            .await
            .unwrap();

        assert_eq!(source.list_requests(), vec!["b1"]);
        let summaries: Vec<_> = cards.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Fix login", "Write docs"]);
        assert_eq!(cards[0].story_points, Some(3.0));
        assert_eq!(cards[0].details["Steps"], vec!["repro", "fix"]);
    }

    #[tokio::test]
    async fn unmatched_board_never_reaches_list_stage() {
        let source = source();
        let err = SyncPipeline::new(&source)
            .collect(&patterns("Nothing"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::NoMatch {
                stage: Stage::Boards,
                ..
            }
        ));
        assert_eq!(source.calls("board_lists"), 0);
        assert_eq!(source.calls("list_cards"), 0);
    }

    #[tokio::test]
    async fn preview_does_not_touch_tracker() {
        let source = source();
        let tracker = MockTracker::new("Epic");
        let report = SyncPipeline::new(&source)
            .sync(&patterns(".*"), SyncMode::Preview)
            .await
            .unwrap();

        assert_eq!(report.cards.len(), 3);
        assert!(report.issues.is_empty());
        assert_eq!(tracker.calls(), 0);
    }

    #[tokio::test]
    async fn apply_creates_issue_per_card() {
        let source = source();
        let tracker = MockTracker::new("Epic");
        let labels = vec!["test-case".to_string()];
        let report = SyncPipeline::new(&source)
            .sync(
                &patterns("Sprint"),
                SyncMode::Apply {
                    tracker: &tracker,
                    epic: "PROJ-1",
                    extra_labels: &labels,
                },
            )
            .await
            .unwrap();

        assert_eq!(report.issues.len(), 2);
        let created = tracker.created();
        assert_eq!(created[0]["fields"]["summary"], "Fix login");
        assert_eq!(created[0]["fields"]["customfield_11"], 3.0);
    }

    #[tokio::test]
    async fn pipeline_error_stops_before_tracker() {
        let source = source().failing("list_cards", "l1");
        let tracker = MockTracker::new("Epic");
        let err = SyncPipeline::new(&source)
            .sync(
                &patterns("Sprint"),
                SyncMode::Apply {
                    tracker: &tracker,
                    epic: "PROJ-1",
                    extra_labels: &[],
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Pipeline(PipelineError::FetchStage { .. })));
        assert_eq!(tracker.calls(), 0);
    }
}
