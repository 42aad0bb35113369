use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The time range an aggregate is computed over.
///
/// Two forms exist side by side, matching the two query styles the reports
/// expose:
///
/// - `trailing(now, days)`: a lower bound only ("everything since N days
///   ago"), with an open upper end.
/// - `between(start, end)`: an explicit range, inclusive of both bounds.
///
/// The asymmetry between the open-ended trailing form and the inclusive
/// explicit form is kept deliberately; callers pick the form their report
/// contract specifies rather than this type normalizing one into the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    /// The trailing window `[now - days, ...)`, open at the upper end.
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: Some(now - Duration::days(days)),
            end: None,
        }
    }

    /// An explicit window, inclusive of both `start` and `end`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The unbounded window used by full-history aggregation.
    pub fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Whether `at` falls inside this window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if at < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at > end {
                return false;
            }
        }
        true
    }
}
