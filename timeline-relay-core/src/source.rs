//! Source client for a Weibo-style `home_timeline` endpoint.
//!
//! One GET per poll cycle, requesting page 1 of items strictly newer than
//! the cursor. The JSON envelope is decoded all-or-nothing: a single
//! unparsable timestamp discards the whole batch.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use crate::config::SourceSettings;
use crate::contract::{FeedItem, TimelineSource};
use crate::error::{RelayError, RelayResult};

/// `created_at` layout used by the source, e.g. `Tue May 31 17:46:55 +0800 2011`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

#[derive(Debug, Deserialize)]
struct TimelineEnvelope {
    #[serde(default)]
    statuses: Vec<RawStatus>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    user: RawUser,
    id: i64,
    created_at: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    name: String,
    screen_name: String,
}

pub fn parse_created_at(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
}

/// Decode a timeline response body into items, preserving source order.
pub fn decode_timeline(body: &str) -> RelayResult<Vec<FeedItem>> {
    let envelope: TimelineEnvelope = serde_json::from_str(body)?;

    if let Some(message) = envelope.error {
        return Err(RelayError::SourceApi {
            message,
            code: envelope.error_code,
        });
    }

    envelope
        .statuses
        .into_iter()
        .map(|status| {
            let created_at = parse_created_at(&status.created_at).map_err(|source| {
                RelayError::TimestampParse {
                    id: status.id,
                    raw: status.created_at.clone(),
                    source,
                }
            })?;
            Ok(FeedItem {
                author_name: status.user.name,
                author_handle: status.user.screen_name,
                id: status.id,
                raw_created_at: status.created_at,
                created_at,
                text: status.text,
            })
        })
        .collect()
}

/// HTTP client for the source timeline.
pub struct WeiboTimeline {
    client: Client,
    api_url: String,
    access_token: String,
    page_size: u32,
}

impl WeiboTimeline {
    pub fn new(access_token: impl Into<String>, settings: &SourceSettings) -> RelayResult<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("timeline-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            api_url = %settings.api_url,
            page_size = settings.page_size(),
            "Initialised timeline client"
        );

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            access_token: access_token.into(),
            page_size: settings.page_size(),
        })
    }

    /// Query parameters for a request of items newer than `since_id`.
    pub fn query(&self, since_id: i64) -> Vec<(&'static str, String)> {
        vec![
            ("access_token", self.access_token.clone()),
            ("since_id", since_id.to_string()),
            ("max_id", "0".to_string()),
            ("count", self.page_size.to_string()),
            ("page", "1".to_string()),
            ("base_app", "0".to_string()),
            ("feature", "0".to_string()),
            ("trim_user", "0".to_string()),
        ]
    }
}

#[async_trait]
impl TimelineSource for WeiboTimeline {
    #[instrument(skip(self))]
    async fn fetch(&self, since_id: i64) -> RelayResult<Vec<FeedItem>> {
        debug!(since_id, "[FETCH] Requesting timeline");

        let resp = self
            .client
            .get(&self.api_url)
            .query(&self.query(since_id))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, since_id, "[FETCH][ERROR] Timeline request failed");
                RelayError::FetchTransport(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(RelayError::FetchTransport)?;

        if !status.is_success() {
            error!(status = %status, since_id, "[FETCH][ERROR] Timeline returned non-success status");
            return Err(RelayError::FetchStatus {
                status: status.as_u16(),
                body,
            });
        }

        let items = decode_timeline(&body)?;
        debug!(since_id, count = items.len(), "[FETCH] Timeline decoded");
        Ok(items)
    }
}
