//! J-Quants API client.

use super::model::{ListedInfo, ListedInfoResponse, RawStatement, StatementsPage};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// J-Quants API base URL
const JQUANTS_BASE_URL: &str = "https://api.jquants.com/v1";

/// User agent sent with every request
const USER_AGENT: &str = concat!("kessan/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenResponse {
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenResponse {
    id_token: Option<String>,
}

/// Selects statements by issue code, disclosure date, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementsQuery {
    /// Issue code (four or five characters)
    pub code: Option<String>,
    /// Disclosure date
    pub date: Option<NaiveDate>,
}

impl StatementsQuery {
    /// Statements of one company.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            date: None,
        }
    }

    /// Statements disclosed on one date.
    pub const fn date(date: NaiveDate) -> Self {
        Self {
            code: None,
            date: Some(date),
        }
    }

    /// Query-string parameters, including the pagination key when following pages.
    pub fn params(&self, pagination_key: Option<&str>) -> Result<Vec<(&'static str, String)>> {
        if self.code.is_none() && self.date.is_none() {
            return Err(DataError::EmptyQuery);
        }

        let mut params = Vec::with_capacity(3);
        if let Some(code) = &self.code {
            params.push(("code", code.clone()));
        }
        if let Some(date) = self.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(key) = pagination_key {
            params.push(("pagination_key", key.to_string()));
        }
        Ok(params)
    }
}

/// J-Quants API client
///
/// Requests are made once; failures are returned to the caller without retry.
///
/// # Example
/// ```no_run
/// use kessan_data::jquants::{JQuantsClient, StatementsQuery};
///
/// # async fn example() -> kessan_data::Result<()> {
/// let mut client = JQuantsClient::new()?;
/// client.authenticate("user@example.com", "password").await?;
/// let statements = client.fetch_statements(&StatementsQuery::code("7203")).await?;
/// println!("{} statements", statements.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JQuantsClient {
    client: reqwest::Client,
    base_url: String,
    id_token: Option<String>,
}

impl JQuantsClient {
    /// Create a client for the public API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(JQUANTS_BASE_URL)
    }

    /// Create a client for another API root, e.g. a local mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            id_token: None,
        })
    }

    /// Use an ID token obtained elsewhere.
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// Whether an ID token is available.
    pub const fn is_authenticated(&self) -> bool {
        self.id_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Exchange credentials for a refresh token, then the refresh token for an ID token.
    pub async fn authenticate(&mut self, email: &str, password: &str) -> Result<()> {
        info!("getting refresh token");
        let response = self
            .client
            .post(self.url("token/auth_user"))
            .json(&serde_json::json!({ "mailaddress": email, "password": password }))
            .send()
            .await?;
        let refresh: RefreshTokenResponse = Self::parse(response).await?;
        let refresh_token = refresh
            .refresh_token
            .ok_or_else(|| DataError::Auth("no refreshToken in response".to_string()))?;

        info!("getting ID token");
        let response = self
            .client
            .post(self.url("token/auth_refresh"))
            .query(&[("refreshtoken", refresh_token.as_str())])
            .send()
            .await?;
        let id: IdTokenResponse = Self::parse(response).await?;
        let id_token = id
            .id_token
            .ok_or_else(|| DataError::Auth("no idToken in response".to_string()))?;

        self.id_token = Some(id_token);
        Ok(())
    }

    fn bearer(&self) -> Result<&str> {
        self.id_token.as_deref().ok_or(DataError::NotAuthenticated)
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DataError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    /// Fetch every listed issue with its company name.
    pub async fn fetch_listed_info(&self) -> Result<Vec<ListedInfo>> {
        info!("fetching company info");
        let response = self
            .client
            .get(self.url("listed/info"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        let payload: ListedInfoResponse = Self::parse(response).await?;
        Ok(payload.info)
    }

    /// Fetch all statements matching `query`, following pagination.
    pub async fn fetch_statements(&self, query: &StatementsQuery) -> Result<Vec<RawStatement>> {
        let token = self.bearer()?;
        let mut statements = Vec::new();
        let mut pagination_key: Option<String> = None;

        loop {
            let params = query.params(pagination_key.as_deref())?;
            debug!(?params, "fetching statements");
            let response = self
                .client
                .get(self.url("fins/statements"))
                .bearer_auth(token)
                .query(&params)
                .send()
                .await?;
            let page: StatementsPage = Self::parse(response).await?;
            statements.extend(page.statements);

            match page.pagination_key {
                Some(key) if !key.is_empty() => pagination_key = Some(key),
                _ => break,
            }
        }

        info!(
            code = ?query.code,
            date = ?query.date,
            count = statements.len(),
            "fetched statements"
        );
        Ok(statements)
    }
}
