use burnboard_core::{DateRange, DEFAULT_CURRENCY};
use chrono::NaiveDate;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::aggregate::{sum_cents, Direction};
use crate::config::RevolutConfig;
use crate::error::RevolutError;
use crate::jwt::AssertionSigner;

const UA: &str = concat!("burnboard/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevolutAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Upstream status and body, whatever their shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawResponse {
    pub status: u16,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveTotal {
    pub total_cents: i64,
    pub currency: String,
}

pub struct RevolutClient {
    http: reqwest::Client,
    api_base: String,
    signer: AssertionSigner,
}

impl RevolutClient {
    pub fn new(config: &RevolutConfig) -> Result<Self, RevolutError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(UA)
            .build()?;
        Ok(RevolutClient {
            http,
            api_base: config.api_base.clone(),
            signer: AssertionSigner::new(config)?,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.api_base, path)
        }
    }

    /// Every call signs a new assertion; tokens are never reused.
    async fn send(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, RevolutError> {
        let token = self.signer.sign()?;
        let url = self.url(path);
        tracing::debug!(%url, "revolut request");
        Ok(self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RevolutError> {
        let resp = self.send(path, &[]).await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RevolutError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Never fails on status; a body that is not JSON is replaced by a marker object.
    pub async fn fetch_raw(&self, path: &str) -> Result<RawResponse, RevolutError> {
        self.fetch_raw_with_query(path, &[]).await
    }

    /// Like [`fetch_raw`](Self::fetch_raw), with `query` pairs appended to the
    /// URL as given.
    pub async fn fetch_raw_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RawResponse, RevolutError> {
        let resp = self.send(path, query).await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        let data = serde_json::from_str(&text)
            .unwrap_or_else(|_| serde_json::json!({ "_parseError": "response was not JSON" }));
        Ok(RawResponse { status, data })
    }

    pub async fn accounts(&self) -> Result<Vec<RevolutAccount>, RevolutError> {
        match self.get_json::<Value>("/accounts").await? {
            list @ Value::Array(_) => Ok(serde_json::from_value(list)?),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn transactions(
        &self,
        account_id: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Value>, RevolutError> {
        match self.get_json::<Value>(&transactions_path(account_id, range)).await? {
            Value::Array(txs) => Ok(txs),
            _ => Ok(Vec::new()),
        }
    }

    /// Month-to-date total across all accounts, fetched one account at a
    /// time. `None` when the business has no accounts.
    pub async fn month_to_date_total(
        &self,
        direction: Direction,
        today: NaiveDate,
    ) -> Result<Option<LiveTotal>, RevolutError> {
        let accounts = self.accounts().await?;
        if accounts.is_empty() {
            return Ok(None);
        }

        let range = DateRange::month_to_date(today);
        let mut total_cents = 0;
        for account in &accounts {
            let txs = self.transactions(&account.id, Some(range)).await?;
            total_cents = sum_cents(&txs, direction).saturating_add(total_cents);
        }

        tracing::debug!(?direction, %range, accounts = accounts.len(), total_cents, "revolut month-to-date total");
        Ok(Some(LiveTotal {
            total_cents,
            currency: DEFAULT_CURRENCY.to_string(),
        }))
    }
}

pub fn transactions_path(account_id: &str, range: Option<DateRange>) -> String {
    match range {
        Some(r) => format!(
            "/accounts/{account_id}/transactions?from={}&to={}",
            r.start.format("%Y-%m-%d"),
            r.end.format("%Y-%m-%d")
        ),
        None => format!("/accounts/{account_id}/transactions"),
    }
}
