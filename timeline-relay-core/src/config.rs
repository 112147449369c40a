//! Tuning sections shared by the loader and the pipeline.
//!
//! Every section has defaults so that a config file only needs credentials.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::filter::FilterPolicy;
use crate::relay::PublishOrder;
use crate::schedule::PollSchedule;

pub const DEFAULT_TIMELINE_URL: &str = "https://api.weibo.com/2/statuses/home_timeline.json";
pub const DEFAULT_STATUS_API_URL: &str = "https://api.twitter.com/1.1";
/// The source never returns more than this many items per page.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_MAX_CHARS: usize = 140;

/// Source timeline request settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    pub api_url: String,
    pub count: u32,
    pub timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TIMELINE_URL.to_string(),
            count: MAX_PAGE_SIZE,
            timeout_secs: 30,
        }
    }
}

impl SourceSettings {
    /// Page size actually requested, capped at [`MAX_PAGE_SIZE`].
    pub fn page_size(&self) -> u32 {
        self.count.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Destination posting settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkSettings {
    pub api_url: String,
    /// Message budget in characters, not bytes.
    pub max_chars: usize,
    pub timeout_secs: u64,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STATUS_API_URL.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
            timeout_secs: 30,
        }
    }
}

impl SinkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything the relay loop needs besides its clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub source: SourceSettings,
    pub sink: SinkSettings,
    pub filter: FilterPolicy,
    pub schedule: PollSchedule,
    pub publish_order: PublishOrder,
}

impl RelaySettings {
    pub fn trace_loaded(&self) {
        info!(
            timeline_url = %self.source.api_url,
            page_size = self.source.page_size(),
            max_chars = self.sink.max_chars,
            filter = self.filter.name(),
            publish_order = ?self.publish_order,
            "Loaded relay settings"
        );
        debug!(?self, "Relay settings loaded (full debug)");
    }
}
