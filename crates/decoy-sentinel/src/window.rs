//! Time windows over which sentinels stay constant.
//!
//! Both ends of a covert channel derive sentinels independently, so they only
//! agree if they hash the same window label. Labels are a truncated UTC
//! timestamp: `%Y-%m-%d %H` for hourly windows and `%Y-%m-%d` for daily ones.

use std::fmt;

use chrono::{DateTime, NaiveTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// How long a set of sentinels stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// Sentinels change every hour on the hour (production).
    #[default]
    Hour,
    /// Sentinels change at midnight UTC. Handy for testbeds, where sentinel
    /// files then only need to be refreshed once a day.
    Day,
}

impl Granularity {
    /// The length of one window.
    pub fn duration(self) -> TimeDelta {
        match self {
            Granularity::Hour => TimeDelta::hours(1),
            Granularity::Day => TimeDelta::days(1),
        }
    }

    fn label_format(self) -> &'static str {
        match self {
            Granularity::Hour => "%Y-%m-%d %H",
            Granularity::Day => "%Y-%m-%d",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hour => write!(f, "hour"),
            Granularity::Day => write!(f, "day"),
        }
    }
}

/// A single hour or day in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    start: DateTime<Utc>,
    granularity: Granularity,
}

impl Window {
    /// The window of the given granularity that contains `utc`.
    pub fn containing(utc: DateTime<Utc>, granularity: Granularity) -> Self {
        let midnight = utc.date_naive().and_time(NaiveTime::MIN);
        let start = match granularity {
            Granularity::Hour => midnight + TimeDelta::hours(i64::from(utc.hour())),
            Granularity::Day => midnight,
        };
        Window {
            start: start.and_utc(),
            granularity,
        }
    }

    /// The window containing the current time. The clock is read once.
    pub fn now(granularity: Granularity) -> Self {
        Self::containing(Utc::now(), granularity)
    }

    /// First instant of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// First instant *after* the window.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.granularity.duration()
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn contains(&self, utc: DateTime<Utc>) -> bool {
        self.start <= utc && utc < self.end()
    }

    pub fn previous(&self) -> Self {
        Window {
            start: self.start - self.granularity.duration(),
            granularity: self.granularity,
        }
    }

    pub fn next(&self) -> Self {
        Window {
            start: self.end(),
            granularity: self.granularity,
        }
    }

    /// The previous, current and next window. A router that accepts
    /// sentinels from all three tolerates up to one window of clock skew
    /// between itself and a client.
    pub fn skew_tolerant(&self) -> [Window; 3] {
        [self.previous(), *self, self.next()]
    }

    /// The label hashed into every sentinel of this window.
    pub fn label(&self) -> String {
        self.start
            .format(self.granularity.label_format())
            .to_string()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format(self.granularity.label_format()))
    }
}

/// The window label for `utc`, or for the current time if `None`.
pub fn window_label(utc: Option<DateTime<Utc>>, granularity: Granularity) -> String {
    let utc = utc.unwrap_or_else(Utc::now);
    Window::containing(utc, granularity).label()
}
