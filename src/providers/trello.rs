use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::BoardSource;
use crate::error::FetchError;
use crate::model::trello::{Board, BoardList, Checklist, Member, RawCard};

const BASE_URL: &str = "https://api.trello.com/1";

pub struct TrelloClient {
    api_key: String,
    token: String,
    base_url: String,
    client: reqwest::Client,
}

impl TrelloClient {
    pub fn new(api_key: String, token: String) -> Self {
        Self {
            api_key,
            token,
            base_url: BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn auth_params(&self) -> [(&str, &str); 2] {
        [("key", &self.api_key), ("token", &self.token)]
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::trace!(%url, "Trello GET");

        let resp = self
            .client
            .get(&url)
            .query(&self.auth_params())
            .query(fields)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl BoardSource for TrelloClient {
    async fn me(&self) -> Result<Member, FetchError> {
        self.get("members/me", &[("fields", "id,idOrganizations")])
            .await
    }

    async fn org_boards(&self, org_id: &str) -> Result<Vec<Board>, FetchError> {
        self.get(
            &format!("organizations/{org_id}/boards"),
            &[("fields", "id,name"), ("filter", "open")],
        )
        .await
    }

    async fn board_lists(&self, board_id: &str) -> Result<Vec<BoardList>, FetchError> {
        self.get(
            &format!("boards/{board_id}/lists"),
            &[("fields", "id,name,idBoard")],
        )
        .await
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<RawCard>, FetchError> {
        self.get(
            &format!("lists/{list_id}/cards"),
            &[("fields", "id,name,desc,shortUrl,idList,labels")],
        )
        .await
    }

    async fn card_checklists(&self, card_id: &str) -> Result<Vec<Checklist>, FetchError> {
        self.get(
            &format!("cards/{card_id}/checklists"),
            &[("fields", "name,idCard"), ("checkItem_fields", "name")],
        )
        .await
    }
}
