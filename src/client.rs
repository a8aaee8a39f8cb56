//! Trade search endpoint: trait seam plus the live HTTP client.
//!
//! The orchestrator only sees [`SearchEndpoint`]; tests script a fake, the
//! binary plugs in [`TradeClient`]. The live client translates HTTP status
//! into the error taxonomy the orchestrator retries on, and never follows
//! up on a rate limit itself; pacing is entirely the orchestrator's job.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{Result, SearchError};
use crate::query::TradeQuery;

/// Search API root. A query POSTed to `{root}/{league}` creates a search.
pub const TRADE_API_BASE: &str = "https://www.pathofexile.com/api/trade2/search/poe2";

/// Site root for viewing a created search in the browser.
pub const TRADE_SITE_BASE: &str = "https://www.pathofexile.com/trade2/search/poe2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limit responses sometimes spell out the wait in the body.
static WAIT_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)wait (\d+) seconds").unwrap());

/// A successfully created search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCreated {
    /// Endpoint-assigned search identifier.
    pub id: String,
    /// Total number of matching listings at creation time.
    pub total: u64,
}

/// The external search endpoint, one submission at a time.
#[async_trait]
pub trait SearchEndpoint: Send + Sync {
    /// Submit a query for a league. Errors are structured so the caller can
    /// distinguish transient rate limits from permanent failures.
    async fn submit(
        &self,
        query: &TradeQuery,
        league: &str,
    ) -> std::result::Result<SearchCreated, SearchError>;
}

/// The browser URL for a created search.
pub fn trade_result_url(league: &str, search_id: &str) -> String {
    format!(
        "{TRADE_SITE_BASE}/{}/{}",
        urlencoding::encode(league),
        search_id
    )
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    id: Option<String>,
    #[serde(default)]
    total: u64,
}

/// Live client for the trade search API.
pub struct TradeClient {
    http: reqwest::Client,
}

impl TradeClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl SearchEndpoint for TradeClient {
    async fn submit(
        &self,
        query: &TradeQuery,
        league: &str,
    ) -> std::result::Result<SearchCreated, SearchError> {
        let url = format!("{TRADE_API_BASE}/{}", urlencoding::encode(league));
        tracing::debug!("Submitting search to {}", url);

        let response = self.http.post(&url).json(query).send().await?;
        let status = response.status();

        if status.as_u16() == 429 {
            let from_header = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            let retry_after = from_header.or_else(|| parse_wait_from_body(&body));
            return Err(SearchError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        match parsed.id {
            Some(id) => Ok(SearchCreated {
                id,
                total: parsed.total,
            }),
            None => Err(SearchError::Malformed(
                "no search id in response".to_string(),
            )),
        }
    }
}

fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Parse "wait N seconds" out of a rate-limit body.
fn parse_wait_from_body(body: &str) -> Option<Duration> {
    let caps = WAIT_SECONDS.captures(body)?;
    caps[1].parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_seconds_parses_from_body() {
        assert_eq!(
            parse_wait_from_body("Rate limit exceeded, please wait 23 seconds."),
            Some(Duration::from_secs(23))
        );
        assert_eq!(
            parse_wait_from_body("Please Wait 7 Seconds before retrying"),
            Some(Duration::from_secs(7))
        );
        assert_eq!(parse_wait_from_body("too many requests"), None);
    }

    #[test]
    fn result_url_encodes_the_league() {
        assert_eq!(
            trade_result_url("Fate of the Vaal", "abc123"),
            "https://www.pathofexile.com/trade2/search/poe2/Fate%20of%20the%20Vaal/abc123"
        );
    }
}
