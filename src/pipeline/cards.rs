use std::collections::HashMap;

use futures::future::try_join_all;

use crate::error::{PipelineError, Stage};
use crate::model::trello::{BoardList, Checklist, RawCard};
use crate::pattern::Pattern;
use crate::providers::BoardSource;

/// Cards on `lists` whose name matches `pattern`, each carrying its checklists.
///
/// Cards keep list order, then their order within the list. Checklists are only
/// fetched for cards that pass the name filter.
pub async fn aggregate_cards(
    source: &dyn BoardSource,
    lists: &[BoardList],
    pattern: &Pattern,
) -> Result<Vec<RawCard>, PipelineError> {
    // Fetch cards for each matched list
    let per_list = try_join_all(lists.iter().map(|l| source.list_cards(&l.id)))
        .await
        .map_err(PipelineError::fetch(Stage::Cards))?;

    let fetched: usize = per_list.iter().map(Vec::len).sum();
    let mut cards: Vec<RawCard> = per_list
        .into_iter()
        .flatten()
        .filter(|c| pattern.is_match(&c.name))
        .collect();
    tracing::debug!(
        fetched,
        matching = cards.len(),
        "Populating card checklists"
    );

    // Fetch checklists only for cards that passed the filter
    let checklists = try_join_all(cards.iter().map(|c| source.card_checklists(&c.id)))
        .await
        .map_err(PipelineError::fetch(Stage::Checklists))?;

    merge_checklists(&mut cards, checklists.into_iter().flatten());
    Ok(cards)
}

/// Attaches each checklist to the card(s) with its owning card id.
///
/// Correlation is by id only, so the order checklists arrive in does not matter.
pub fn merge_checklists(cards: &mut [RawCard], checklists: impl IntoIterator<Item = Checklist>) {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, card) in cards.iter().enumerate() {
        index.entry(card.id.clone()).or_default().push(i);
    }

    for checklist in checklists {
        let Some(owners) = index.get(&checklist.id_card) else {
            tracing::debug!(
                card = %checklist.id_card,
                checklist = %checklist.name,
                "Checklist has no matching card"
            );
            continue;
        };
        if let Some((&last, rest)) = owners.split_last() {
            for &i in rest {
                cards[i].attach_checklist(checklist.clone());
            }
            cards[last].attach_checklist(checklist);
        }
    }
}
