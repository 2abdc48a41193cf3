use std::collections::HashSet;

use futures::future::try_join_all;

use crate::error::{PipelineError, Stage};
use crate::model::trello::Board;
use crate::pattern::Pattern;
use crate::providers::BoardSource;

/// Boards across every organization of the current member whose name matches `pattern`.
///
/// One board listing per organization, issued together. Duplicate board ids keep
/// their first occurrence.
pub async fn resolve_boards(
    source: &dyn BoardSource,
    pattern: &Pattern,
) -> Result<Vec<Board>, PipelineError> {
    // Get member organizations
    let member = source
        .me()
        .await
        .map_err(PipelineError::fetch(Stage::Membership))?;
    if member.id_organizations.is_empty() {
        return Err(PipelineError::NoMembership);
    }
    tracing::debug!(
        member = %member.id,
        organizations = member.id_organizations.len(),
        "Resolved organization memberships"
    );

    // Fetch boards for every organization
    let per_org = try_join_all(
        member
            .id_organizations
            .iter()
            .map(|org| source.org_boards(org)),
    )
    .await
    .map_err(PipelineError::fetch(Stage::Boards))?;

    // Filter by name, first occurrence of a board id wins
    let mut seen = HashSet::new();
    let boards: Vec<Board> = per_org
        .into_iter()
        .flatten()
        .filter(|b| pattern.is_match(&b.name))
        .filter(|b| seen.insert(b.id.clone()))
        .collect();

    if boards.is_empty() {
        return Err(PipelineError::NoMatch {
            stage: Stage::Boards,
            pattern: pattern.as_str().to_string(),
        });
    }

    tracing::debug!(
        count = boards.len(),
        boards = ?boards.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        "Found boards matching {}",
        pattern.as_str()
    );
    Ok(boards)
}
