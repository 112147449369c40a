//! Time-of-day dependent poll pacing.
//!
//! The source enforces a daily request quota, so the relay polls quickly
//! during an "active" hour window and slowly outside of it. Hours are read in
//! a fixed UTC offset rather than the host's local zone.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSchedule {
    pub active_interval_secs: u64,
    pub idle_interval_secs: u64,
    /// First hour of the active window, inclusive.
    pub active_start_hour: u32,
    /// Hour at which the active window closes, exclusive. May be smaller
    /// than `active_start_hour` for windows that wrap midnight.
    pub active_end_hour: u32,
    pub utc_offset_hours: i32,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            active_interval_secs: 30,
            idle_interval_secs: 120,
            active_start_hour: 7,
            active_end_hour: 23,
            utc_offset_hours: 8,
        }
    }
}

impl PollSchedule {
    pub fn validate(&self) -> RelayResult<()> {
        if self.active_start_hour > 23 || self.active_end_hour > 24 {
            return Err(RelayError::Config(format!(
                "active hours must lie within a day, got {}..{}",
                self.active_start_hour, self.active_end_hour
            )));
        }
        if self.utc_offset_hours.abs() > 14 {
            return Err(RelayError::Config(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            )));
        }
        if self.active_interval_secs == 0 || self.idle_interval_secs == 0 {
            return Err(RelayError::Config(
                "poll intervals must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// Whether `hour` (0-23, in the reference offset) falls in the active window.
    /// An empty window (`start == end`) is never active.
    pub fn is_active_hour(&self, hour: u32) -> bool {
        let (start, end) = (self.active_start_hour, self.active_end_hour);
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    /// How long to sleep after a cycle that finished at `now`.
    pub fn interval_at(&self, now: DateTime<Utc>) -> Duration {
        let hour = now.with_timezone(&self.offset()).hour();
        if self.is_active_hour(hour) {
            Duration::from_secs(self.active_interval_secs)
        } else {
            Duration::from_secs(self.idle_interval_secs)
        }
    }
}
