//! Period windows.
//!
//! A named period resolves to a half-open `current` window and, when a
//! comparison makes sense, an equally long `previous` window right before it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Dataset;

/// Named period selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    Last7Days,
    Last30Days,
    AllTime,
}

impl Period {
    pub const ALL: [Period; 7] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::Last7Days,
        Self::Last30Days,
        Self::AllTime,
    ];

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::ThisMonth => "This Month",
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::AllTime => "All Time",
        }
    }

    /// Whether sessions over time should be bucketed by hour.
    pub fn is_intraday(&self) -> bool {
        matches!(self, Self::Today | Self::Yesterday)
    }

    /// Resolves the windows for this period at instant `now`.
    ///
    /// Fails with `EmptyDataset` when there is nothing to window, even for
    /// periods whose bounds do not depend on the data.
    pub fn resolve(&self, now: DateTime<Utc>, dataset: &Dataset) -> Result<PeriodWindows> {
        let earliest = dataset.earliest_start().ok_or(Error::EmptyDataset)?;
        let midnight = start_of_day(now);
        let day = Duration::days(1);

        let windows = match self {
            Self::Today => PeriodWindows::with_previous(
                Window::new(midnight, now),
                Window::new(midnight - day, midnight),
            ),
            Self::Yesterday => PeriodWindows::with_previous(
                Window::new(midnight - day, midnight),
                Window::new(midnight - day * 2, midnight - day),
            ),
            Self::ThisWeek => {
                let days_since_monday = i64::from(now.weekday().num_days_from_monday());
                PeriodWindows::trailing_from(midnight - Duration::days(days_since_monday), now)
            }
            Self::ThisMonth => {
                let first = midnight - Duration::days(i64::from(now.day0()));
                PeriodWindows::trailing_from(first, now)
            }
            Self::Last7Days => PeriodWindows::last_days(now, 7),
            Self::Last30Days => PeriodWindows::last_days(now, 30),
            Self::AllTime => PeriodWindows {
                current: Window::new(earliest, now),
                previous: None,
            },
        };

        Ok(windows)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Accepts labels ("Last 7 Days") as well as snake/kebab tokens.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "thisweek" => Ok(Self::ThisWeek),
            "thismonth" => Ok(Self::ThisMonth),
            "last7days" | "7d" => Ok(Self::Last7Days),
            "last30days" | "30d" => Ok(Self::Last30Days),
            "alltime" | "all" => Ok(Self::AllTime),
            _ => Err(Error::validation(format!("unknown period: {}", s))),
        }
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The window of equal length ending where this one starts.
    pub fn preceding(&self) -> Self {
        Self {
            start: self.start - self.duration(),
            end: self.start,
        }
    }
}

/// Current window plus the comparison window, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindows {
    pub current: Window,
    pub previous: Option<Window>,
}

impl PeriodWindows {
    fn with_previous(current: Window, previous: Window) -> Self {
        Self {
            current,
            previous: Some(previous),
        }
    }

    fn trailing_from(start: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let current = Window::new(start, now);
        Self::with_previous(current, current.preceding())
    }

    fn last_days(now: DateTime<Utc>, days: i64) -> Self {
        Self::trailing_from(now - Duration::days(days), now)
    }

    /// Whether a previous window exists to compare against.
    pub fn has_comparison(&self) -> bool {
        self.previous.is_some()
    }
}

/// Midnight UTC of the day containing `at`.
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}
