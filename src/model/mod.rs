pub mod card;
pub mod tracker;
pub mod trello;
