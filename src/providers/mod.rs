pub mod jira;
pub mod trello;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::model::tracker::{CreatedIssue, FieldDefinition, Issue};
use crate::model::trello::{Board, BoardList, Checklist, Member, RawCard};

/// Read access to the Kanban board service.
#[async_trait]
pub trait BoardSource: Send + Sync {
    /// The member the credentials belong to.
    async fn me(&self) -> Result<Member, FetchError>;
    async fn org_boards(&self, org_id: &str) -> Result<Vec<Board>, FetchError>;
    async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>, FetchError>;
    async fn list_cards(&self, list_id: &str) -> Result<Vec<RawCard>, FetchError>;
    async fn card_checklists(&self, card_id: &str) -> Result<Vec<Checklist>, FetchError>;
}

/// The subset of the issue tracker API a sync needs.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn list_fields(&self) -> Result<Vec<FieldDefinition>, FetchError>;
    async fn get_issue(&self, key: &str) -> Result<Issue, FetchError>;
    async fn create_issue(&self, payload: &serde_json::Value) -> Result<CreatedIssue, FetchError>;
}
