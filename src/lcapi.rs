//! Client for the upstream LeetCode stats API.
//!
//! One GET per request, bounded by a fixed client timeout. Every failure is
//! mapped to an [`UpstreamError`] with a message fit to show a user; raw
//! transport errors never leave this module. No retries happen here — a
//! failed fetch is terminal for the request that triggered it.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use std::time::Duration;

use crate::config::Config;
use crate::models::LeetCodeStats;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    #[error("LeetCode user not found or profile is private")]
    NotFoundOrPrivate,
    #[error("LeetCode API is taking too long to respond. Please try again.")]
    TookTooLong,
    #[error("LeetCode user not found. Please check the username.")]
    NotFound,
    #[error("Too many requests. Please try again in a few minutes.")]
    RateLimited,
    #[error("LeetCode API is temporarily unavailable. Please try again later.")]
    Unavailable,
    #[error("Failed to fetch LeetCode stats. Please try again.")]
    FetchFailed,
}

/// The one capability the workflows need from the outside world. Kept as a
/// trait so tests can substitute a canned provider.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    async fn fetch_stats(&self, handle: &str) -> Result<LeetCodeStats, UpstreamError>;
}

/// Shape of the upstream profile payload. Anything the API leaves out
/// defaults to zero.
#[derive(Deserialize)]
struct StatsResponse {
    #[serde(default)]
    errors: Vec<Value>,

    #[serde(default, rename = "totalSolved")]
    total_solved: u64,
    #[serde(default, rename = "easySolved")]
    easy_solved: u64,
    #[serde(default, rename = "mediumSolved")]
    medium_solved: u64,
    #[serde(default, rename = "hardSolved")]
    hard_solved: u64,
    #[serde(default)]
    ranking: u64,
    #[serde(default)]
    streak: u64,
    #[serde(default, rename = "totalActiveDays")]
    total_active_days: u64,
}

pub struct LeetCodeClient {
    base_url: String,
    client: reqwest::Client,
}

impl LeetCodeClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: config.leetcode_api_base.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl StatsProvider for LeetCodeClient {
    async fn fetch_stats(&self, handle: &str) -> Result<LeetCodeStats, UpstreamError> {
        let url = format!("{}/{}", self.base_url, handle);
        log::info!("[fetch_stats] Fetching LeetCode stats for {handle}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("[fetch_stats] Upstream returned {status} for {handle}");
            return Err(classify_status(status));
        }

        let body = response.text().await.map_err(classify_transport)?;
        parse_stats(&body)
    }
}

/// Maps a send/receive failure onto the user-facing taxonomy.
fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::TookTooLong
    } else {
        log::error!("[classify_transport] LeetCode API error: {err}");
        UpstreamError::FetchFailed
    }
}

/// Maps a non-success HTTP status onto the user-facing taxonomy.
fn classify_status(status: StatusCode) -> UpstreamError {
    match status.as_u16() {
        404 => UpstreamError::NotFound,
        429 => UpstreamError::RateLimited,
        500.. => UpstreamError::Unavailable,
        _ => UpstreamError::FetchFailed,
    }
}

/// Decodes the upstream body into normalized stats. An empty body or an
/// `errors` list both mean the profile is unusable.
fn parse_stats(body: &str) -> Result<LeetCodeStats, UpstreamError> {
    if body.trim().is_empty() {
        return Err(UpstreamError::NotFoundOrPrivate);
    }

    let parsed: StatsResponse = serde_json::from_str(body).map_err(|err| {
        log::error!("[parse_stats] Could not decode upstream body: {err}");
        UpstreamError::FetchFailed
    })?;

    if !parsed.errors.is_empty() {
        return Err(UpstreamError::NotFoundOrPrivate);
    }

    Ok(LeetCodeStats {
        problems: parsed.total_solved,
        easy: parsed.easy_solved,
        medium: parsed.medium_solved,
        hard: parsed.hard_solved,
        ranking: parsed.ranking,
        streak: parsed.streak,
        total_active_days: parsed.total_active_days,
    })
}
