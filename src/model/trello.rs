use indexmap::IndexMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub id_organizations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardList {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub id_board: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
    #[serde(default)]
    pub id_list: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Checklists merged in after fetching, keyed by checklist name.
    #[serde(skip)]
    pub checklists: IndexMap<String, Checklist>,
}

impl RawCard {
    /// Same-named checklists replace the earlier one.
    pub fn attach_checklist(&mut self, checklist: Checklist) {
        self.checklists.insert(checklist.name.clone(), checklist);
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub name: String,
    pub id_card: String,
    #[serde(default)]
    pub check_items: Vec<CheckItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckItem {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_deserializes_from_trello_payload() {
        let json = r#"{
            "id": "5a1",
            "name": "(3) Fix login",
            "desc": "Users cannot log in",
            "shortUrl": "https://trello.com/c/abc",
            "idList": "l1",
            "labels": [{"id": "x", "name": "backend", "color": "red"}]
        }"#;
        let card: RawCard = serde_json::from_str(json).unwrap();
        assert_eq!(card.short_url.as_deref(), Some("https://trello.com/c/abc"));
        assert_eq!(card.id_list.as_deref(), Some("l1"));
        assert_eq!(card.labels[0].name, "backend");
        assert!(card.checklists.is_empty());
    }

    #[test]
    fn member_without_organizations_defaults_to_empty() {
        let member: Member = serde_json::from_str(r#"{"id": "me"}"#).unwrap();
        assert!(member.id_organizations.is_empty());
    }

    #[test]
    fn attaching_same_name_twice_keeps_last() {
        let mut card: RawCard =
            serde_json::from_str(r#"{"id": "c1", "name": "Card"}"#).unwrap();
        let first: Checklist = serde_json::from_str(
            r#"{"name": "Steps", "idCard": "c1", "checkItems": [{"name": "old"}]}"#,
        )
        .unwrap();
        let second: Checklist = serde_json::from_str(
            r#"{"name": "Steps", "idCard": "c1", "checkItems": [{"name": "new"}]}"#,
        )
        .unwrap();

        card.attach_checklist(first);
        card.attach_checklist(second);

        assert_eq!(card.checklists.len(), 1);
        assert_eq!(card.checklists["Steps"].check_items[0].name, "new");
    }
}
