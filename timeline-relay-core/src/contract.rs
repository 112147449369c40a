//! # contract: the seams of the relay pipeline
//!
//! This module defines the data that flows through one poll cycle and the
//! traits each stage is reached through:
//!
//! - [`TimelineSource`]: fetches items newer than a cursor.
//! - [`FeedFilter`]: decides whether an item is forwarded.
//! - [`Publisher`]: verifies credentials once and posts messages.
//! - [`Clock`]: reads wall-clock time and sleeps between cycles.
//!
//! ## Mocking & Testing
//! Every trait is annotated for `mockall`, so tests can drive the loop
//! without network access or real delays. The mocks are exported when the
//! `test-export-mocks` feature is on (the default) so that dependent crates
//! and integration tests can use them too.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
#[allow(unused_imports)]
use mockall::{automock, predicate::*};

use crate::error::RelayResult;

/// A single timeline entry, normalised from the source envelope.
///
/// Items live for the duration of one poll cycle and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Display name of the author, used as the message prefix.
    pub author_name: String,
    /// Account handle (`screen_name`), used by source-aware filtering.
    pub author_handle: String,
    /// Source-assigned id, monotonically increasing.
    pub id: i64,
    /// `created_at` exactly as the source sent it.
    pub raw_created_at: String,
    pub created_at: DateTime<FixedOffset>,
    pub text: String,
}

/// Identity returned by destination credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub screen_name: String,
}

/// Identifier of a post created on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostId(pub String);

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetches timeline items strictly newer than a cursor.
///
/// Implementations return items in the source's native order (newest first)
/// and must distinguish "request failed" (an `Err`) from "nothing new"
/// (`Ok(vec![])`).
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TimelineSource: Send + Sync {
    async fn fetch(&self, since_id: i64) -> RelayResult<Vec<FeedItem>>;
}

/// Posts messages to the destination platform.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Confirm the configured credentials. Called once at startup.
    async fn verify_credentials(&self) -> RelayResult<Account>;

    /// Publish an already-composed message and return the new post's id.
    async fn publish(&self, text: &str) -> RelayResult<PostId>;
}

/// Pure forwarding predicate.
///
/// Implementations must not keep state between calls: asking twice about the
/// same item yields the same answer.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait FeedFilter: Send + Sync {
    fn should_forward(&self, item: &FeedItem) -> bool;
}

/// Source of wall-clock time and of the delay between poll cycles.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by the system time and the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
