use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, COOKIE};

use super::IssueTracker;
use crate::error::FetchError;
use crate::model::tracker::{CreatedIssue, FieldDefinition, Issue};

/// How requests to Jira are authenticated.
#[derive(Debug, Clone)]
pub enum JiraAuth {
    Basic { username: String, password: String },
    /// A negotiated `JSESSIONID=...` cookie.
    Session(String),
}

impl JiraAuth {
    fn header(&self) -> (reqwest::header::HeaderName, String) {
        match self {
            JiraAuth::Basic { username, password } => {
                let creds = format!("{username}:{password}");
                let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
                (AUTHORIZATION, format!("Basic {encoded}"))
            }
            JiraAuth::Session(cookie) => (COOKIE, cookie.clone()),
        }
    }
}

pub struct JiraClient {
    base_url: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(host: &str, auth: &JiraAuth, strict_ssl: bool) -> Result<Self, FetchError> {
        let (name, value) = auth.header();
        let mut value = HeaderValue::from_str(&value)
            .map_err(|_| FetchError::Api("credentials contain invalid header characters".into()))?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!strict_ssl)
            .build()?;

        Ok(Self {
            base_url: format!("https://{host}/rest/api/2"),
            client,
        })
    }

    async fn read<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
        url: String,
    ) -> Result<T, FetchError> {
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
impl IssueTracker for JiraClient {
    async fn list_fields(&self) -> Result<Vec<FieldDefinition>, FetchError> {
        let url = format!("{}/field", self.base_url);
        let resp = self.client.get(&url).send().await?;
        Self::read(resp, url).await
    }

    async fn get_issue(&self, key: &str) -> Result<Issue, FetchError> {
        let url = format!("{}/issue/{}", self.base_url, urlencoding::encode(key));
        let resp = self
            .client
            .get(&url)
            .query(&[("fields", "issuetype,project,fixVersions")])
            .send()
            .await?;
        Self::read(resp, url).await
    }

    async fn create_issue(&self, payload: &serde_json::Value) -> Result<CreatedIssue, FetchError> {
        let url = format!("{}/issue", self.base_url);
        let resp = self.client.post(&url).json(payload).send().await?;
        Self::read(resp, url).await
    }
}
