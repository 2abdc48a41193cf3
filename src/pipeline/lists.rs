use futures::future::try_join_all;

use crate::error::{PipelineError, Stage};
use crate::model::trello::{Board, BoardList};
use crate::pattern::Pattern;
use crate::providers::BoardSource;

/// Lists on `boards` whose name matches `pattern`, in board order.
///
/// Boards without a matching list simply contribute nothing.
pub async fn resolve_lists(
    source: &dyn BoardSource,
    boards: &[Board],
    pattern: &Pattern,
) -> Result<Vec<BoardList>, PipelineError> {
    // Fetch lists for each matched board
    let per_board = try_join_all(boards.iter().map(|b| source.board_lists(&b.id)))
        .await
        .map_err(PipelineError::fetch(Stage::Lists))?;

    let lists: Vec<BoardList> = per_board
        .into_iter()
        .flatten()
        .filter(|l| pattern.is_match(&l.name))
        .collect();

    if lists.is_empty() {
        return Err(PipelineError::NoMatch {
            stage: Stage::Lists,
            pattern: pattern.as_str().to_string(),
        });
    }

    for list in &lists {
        tracing::trace!(list = %list.name, board = ?list.id_board, "Matched list");
    }
    tracing::debug!(count = lists.len(), "Found associated lists");
    Ok(lists)
}
