//! Reminder interval keys and the windows derived from them.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Reminder lead-time keys, as written in a directive's `reminderTimes`.
///
/// The table is fixed: hour keys map to their hour count, day keys to
/// 24/48/120 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKey {
    H1,
    H2,
    H4,
    H8,
    H12,
    D1,
    D2,
    D5,
}

impl IntervalKey {
    /// All keys, in the fixed enumeration order used by the aggregator.
    pub const ALL: [IntervalKey; 8] = [
        Self::H1,
        Self::H2,
        Self::H4,
        Self::H8,
        Self::H12,
        Self::D1,
        Self::D2,
        Self::D5,
    ];

    /// Hours between the reference instant and the start of this key's window.
    pub fn offset_hours(&self) -> i64 {
        match self {
            Self::H1 => 1,
            Self::H2 => 2,
            Self::H4 => 4,
            Self::H8 => 8,
            Self::H12 => 12,
            Self::D1 => 24,
            Self::D2 => 48,
            Self::D5 => 120,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H4 => "h4",
            Self::H8 => "h8",
            Self::H12 => "h12",
            Self::D1 => "d1",
            Self::D2 => "d2",
            Self::D5 => "d5",
        }
    }
}

impl fmt::Display for IntervalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h1" => Ok(Self::H1),
            "h2" => Ok(Self::H2),
            "h4" => Ok(Self::H4),
            "h8" => Ok(Self::H8),
            "h12" => Ok(Self::H12),
            "d1" => Ok(Self::D1),
            "d2" => Ok(Self::D2),
            "d5" => Ok(Self::D5),
            _ => Err(()),
        }
    }
}

/// Parse a raw comma-separated `reminderTimes` field into a key set.
/// Unknown tokens are dropped with a warning; they can never match a window.
pub fn parse_reminder_times(raw: &str) -> BTreeSet<IntervalKey> {
    crate::task::split_listing(raw)
        .into_iter()
        .filter_map(|token| match token.parse() {
            Ok(key) => Some(key),
            Err(()) => {
                warn!("ignoring unknown reminder interval '{token}'");
                None
            }
        })
        .collect()
}

/// Concrete half-open time range `[start, end)` for one interval key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub key: IntervalKey,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReminderWindow {
    /// Whether an instant falls inside the window: inclusive start,
    /// exclusive end, so adjacent windows never both match.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// One window per interval key, in enumeration order.
///
/// For a key with offset `h`: `start = now + h hours`, `end = start + 1 hour`.
pub fn reminder_windows(now: NaiveDateTime) -> Vec<ReminderWindow> {
    IntervalKey::ALL
        .iter()
        .map(|&key| {
            let start = now + Duration::hours(key.offset_hours());
            ReminderWindow {
                key,
                start,
                end: start + Duration::hours(1),
            }
        })
        .collect()
}
