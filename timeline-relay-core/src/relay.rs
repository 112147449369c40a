//! The poll loop: fetch → filter → forward → advance cursor → sleep.
//!
//! # Lifecycle
//! - [`Relay::start`] verifies destination credentials (fatal on failure) and
//!   performs the seed fetch. Seed items are never forwarded; they only
//!   establish the cursor.
//! - [`Relay::run_cycle`] performs one cycle and returns a [`CycleReport`].
//! - [`Relay::run`] repeats cycles, sleeping between them for the interval the
//!   [`PollSchedule`] picks for the current hour.
//!
//! # Error Handling
//! Only startup errors escape. A failed fetch leaves the cursor untouched and
//! publishes nothing; a failed publish skips that one item. Neither is
//! retried: recovery is waiting for the next cycle.
//!
//! The cursor lives in memory only, so a restart re-seeds from the freshest
//! item and whatever arrived while the process was down is skipped.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::RelaySettings;
use crate::contract::{Account, Clock, FeedFilter, FeedItem, PostId, Publisher, TimelineSource};
use crate::error::{RelayError, RelayResult};
use crate::message;
use crate::schedule::PollSchedule;

/// Order in which a fetched batch is published.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOrder {
    /// Ascending id, so replies never precede what they answer.
    #[default]
    OldestFirst,
    /// The source's native newest-first order.
    Received,
}

impl PublishOrder {
    fn arrange(self, mut items: Vec<FeedItem>) -> Vec<FeedItem> {
        if self == PublishOrder::OldestFirst {
            items.sort_by_key(|item| item.id);
        }
        items
    }
}

/// Highest item id already processed. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(i64);

impl Cursor {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    /// Move to the newest id in `batch`. Returns whether the cursor moved.
    pub fn advance(&mut self, batch: &[FeedItem]) -> bool {
        match batch.iter().map(|item| item.id).max() {
            Some(newest) if newest > self.0 => {
                self.0 = newest;
                true
            }
            _ => false,
        }
    }
}

/// Outcome of a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cursor_before: i64,
    pub cursor_after: i64,
    pub fetched: usize,
    pub forwarded: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Items at or below the cursor that the source returned anyway.
    pub skipped_stale: usize,
    pub published: Vec<PostId>,
    pub fetch_error: Option<String>,
}

/// Totals over a bounded [`Relay::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub forwarded: usize,
    pub failed: usize,
}

pub struct Relay<S, P, C> {
    source: S,
    publisher: P,
    clock: C,
    filter: Box<dyn FeedFilter>,
    schedule: PollSchedule,
    order: PublishOrder,
    max_chars: usize,
    cursor: Cursor,
}

impl<S, P, C> Relay<S, P, C>
where
    S: TimelineSource,
    P: Publisher,
    C: Clock,
{
    pub fn new(
        source: S,
        publisher: P,
        clock: C,
        filter: Box<dyn FeedFilter>,
        settings: &RelaySettings,
    ) -> Self {
        Self {
            source,
            publisher,
            clock,
            filter,
            schedule: settings.schedule.clone(),
            order: settings.publish_order,
            max_chars: settings.sink.max_chars,
            cursor: Cursor::default(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor.value()
    }

    /// Verify credentials, then seed the cursor. Returns the logged-in account.
    pub async fn start(&mut self) -> RelayResult<Account> {
        let account = self.publisher.verify_credentials().await.map_err(|e| match e {
            RelayError::CredentialVerification(_) => e,
            other => RelayError::CredentialVerification(other.to_string()),
        })?;
        info!(name = %account.name, screen_name = %account.screen_name, "[RELAY] Logged in");

        self.seed().await;
        Ok(account)
    }

    /// Fetch once without forwarding, to find the starting cursor.
    /// A failed seed fetch leaves the cursor at zero.
    pub async fn seed(&mut self) -> i64 {
        match self.source.fetch(0).await {
            Ok(items) => {
                self.cursor.advance(&items);
                debug!(count = items.len(), "[RELAY] Seed fetch returned items");
            }
            Err(e) => {
                error!(error = %e, "[RELAY][ERROR] Seed fetch failed");
            }
        }
        info!(cursor = self.cursor.value(), "[RELAY] Initial cursor set");
        self.cursor.value()
    }

    pub async fn run_cycle(&mut self) -> CycleReport {
        let cursor_before = self.cursor.value();
        let mut report = CycleReport {
            cursor_before,
            cursor_after: cursor_before,
            ..Default::default()
        };

        let items = match self.source.fetch(cursor_before).await {
            Ok(items) => items,
            Err(e) => {
                error!(error = %e, cursor = cursor_before, "[RELAY][ERROR] Fetch failed, skipping cycle");
                report.fetch_error = Some(e.to_string());
                return report;
            }
        };
        report.fetched = items.len();
        info!(count = items.len(), cursor = cursor_before, "[RELAY] Fetched timeline");

        let advanced = self.cursor.advance(&items);
        for item in self.order.arrange(items) {
            if item.id <= cursor_before {
                warn!(id = item.id, cursor = cursor_before, "[RELAY] Source returned an already processed item");
                report.skipped_stale += 1;
                continue;
            }
            if !self.filter.should_forward(&item) {
                report.rejected += 1;
                continue;
            }

            let text = message::compose(&item, self.max_chars);
            match self.publisher.publish(&text).await {
                Ok(post_id) => {
                    info!(post_id = %post_id, id = item.id, author = %item.author_handle, "[RELAY] Forwarded item");
                    report.forwarded += 1;
                    report.published.push(post_id);
                }
                Err(e) => {
                    error!(error = %e, id = item.id, author = %item.author_handle, text = %item.text, "[RELAY][ERROR] Failed to forward item");
                    report.failed += 1;
                }
            }
        }

        if advanced {
            info!(cursor = self.cursor.value(), "[RELAY] Cursor advanced");
        }
        report.cursor_after = self.cursor.value();
        report
    }

    /// Run cycles until `max_cycles` is reached, or forever when `None`.
    pub async fn run(&mut self, max_cycles: Option<u64>) -> RunSummary {
        let limit_reached = |cycles: u64| max_cycles.is_some_and(|max| cycles >= max);
        let mut summary = RunSummary::default();
        loop {
            if limit_reached(summary.cycles) {
                info!(cycles = summary.cycles, "[RELAY] Cycle limit reached, stopping");
                return summary;
            }

            let report = self.run_cycle().await;
            summary.cycles += 1;
            summary.forwarded += report.forwarded;
            summary.failed += report.failed;

            // No sleep after the final cycle.
            if limit_reached(summary.cycles) {
                info!(cycles = summary.cycles, "[RELAY] Cycle limit reached, stopping");
                return summary;
            }

            let interval = self.schedule.interval_at(self.clock.now());
            debug!(seconds = interval.as_secs(), "[RELAY] Sleeping until next cycle");
            self.clock.sleep(interval).await;
        }
    }
}
