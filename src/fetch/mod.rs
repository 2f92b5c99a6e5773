//! Cube API client.
//!
//! Issues one statistics query per trophy bracket, all brackets in flight
//! concurrently, and flattens the surviving rows into a single observation
//! list. A failed bracket is logged and skipped rather than failing the
//! batch; all brackets failing yields an empty list.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, ORIGIN, REFERER};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use url::Url;

use crate::models::RawObservation;

/// Errors that can occur while fetching statistics.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Configuration for the cube client.
#[derive(Debug, Clone)]
pub struct CubeConfig {
    /// Cube load endpoint.
    pub base_url: Url,

    /// Request timeout.
    pub timeout: Duration,

    /// Trophy brackets to query, one request each.
    pub trophy_ranges: Vec<String>,

    /// Origin header the API expects.
    pub origin: String,

    /// Referer header the API expects.
    pub referer: String,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://cube.brawltime.ninja/cubejs-api/v1/load")
                .expect("Invalid default cube URL"),
            timeout: Duration::from_secs(30),
            trophy_ranges: ["6", "8", "10", "11", "12", "13", "14", "15"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            origin: "https://brawltime.ninja".to_string(),
            referer: "https://brawltime.ninja/".to_string(),
        }
    }
}

/// Source of per-map brawler statistics.
///
/// The ranking flow only depends on this trait; tests drive it with a mock.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch observations for one mode/map across all configured brackets.
    ///
    /// Returns an empty vec (not an error) when every bracket fails.
    async fn fetch_map_stats(
        &self,
        mode: &str,
        map_name: &str,
        min_date: &str,
    ) -> Result<Vec<RawObservation>, FetchError>;
}

/// HTTP client for the brawltime cube API.
pub struct CubeClient {
    client: Client,
    config: CubeConfig,
}

impl CubeClient {
    /// Create a client holding the given bearer token.
    pub fn new(config: CubeConfig, token: &str) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(token)?);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ORIGIN, HeaderValue::from_str(&config.origin)?);
        headers.insert(REFERER, HeaderValue::from_str(&config.referer)?);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl StatsSource for CubeClient {
    async fn fetch_map_stats(
        &self,
        mode: &str,
        map_name: &str,
        min_date: &str,
    ) -> Result<Vec<RawObservation>, FetchError> {
        let mut tasks = JoinSet::new();

        for trophy_range in &self.config.trophy_ranges {
            let client = self.client.clone();
            let url = self.config.base_url.clone();
            let range = trophy_range.clone();
            let query = build_query(mode, map_name, min_date, trophy_range).to_string();

            tasks.spawn(async move {
                let result = fetch_bracket(&client, url, &query).await;
                (range, result)
            });
        }

        let mut observations = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((range, Ok(rows))) => {
                    debug!("Trophy range {}: {} rows", range, rows.len());
                    observations.extend(rows);
                }
                Ok((range, Err(e))) => {
                    warn!("Trophy range {} failed: {}", range, e);
                }
                Err(e) => {
                    warn!("Bracket task panicked: {}", e);
                }
            }
        }

        if observations.is_empty() {
            warn!("No data retrieved for any trophy range");
        }

        Ok(observations)
    }
}

/// Build the cube query body for one trophy bracket.
fn build_query(mode: &str, map_name: &str, min_date: &str, trophy_range: &str) -> Value {
    json!({
        "measures": ["map.winRate_measure", "map.picks_measure"],
        "dimensions": ["map.brawler_dimension"],
        "filters": [
            {"member": "map.season_dimension", "operator": "gte", "values": [min_date]},
            {"member": "map.mode_dimension", "operator": "equals", "values": [mode]},
            {"member": "map.map_dimension", "operator": "equals", "values": [map_name]},
            {"member": "map.trophyRange_dimension", "operator": "equals", "values": [trophy_range]}
        ]
    })
}

/// Cube API response envelope.
#[derive(Debug, Deserialize)]
struct CubeResponse {
    #[serde(default)]
    results: Vec<CubeResult>,
}

#[derive(Debug, Deserialize)]
struct CubeResult {
    #[serde(default)]
    data: Vec<Value>,
}

/// Issue one bracket query and decode its rows.
async fn fetch_bracket(
    client: &Client,
    url: Url,
    query: &str,
) -> Result<Vec<RawObservation>, FetchError> {
    let response = client
        .get(url)
        .query(&[("query", query), ("queryType", "multi")])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let body: CubeResponse = serde_json::from_str(&response.text().await?)?;
    let rows = body.results.into_iter().next().map(|r| r.data).unwrap_or_default();

    Ok(decode_rows(&rows))
}

/// Decode response rows, dropping (and logging) malformed ones individually.
fn decode_rows(rows: &[Value]) -> Vec<RawObservation> {
    rows.iter()
        .filter_map(|row| match RawObservation::from_row(row) {
            Ok(obs) => Some(obs),
            Err(e) => {
                warn!("Dropping malformed row: {}", e);
                None
            }
        })
        .collect()
}
