//! Bar intervals supported by the trainer.
//!
//! Only a fixed set of identifiers is accepted: `5m`, `15m`, `30m`, `1h`,
//! `4h` and `1d`. Anything else is rejected when parsing, so the fetch and
//! generation paths never see an unknown interval.

use std::{fmt, str::FromStr};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid timeframe `{input}`, expected one of 5m, 15m, 30m, 1h, 4h, 1d")]
    InvalidTimeframe { input: String },
}

/// A fixed-duration bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeFrame {
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    FourHours,
    OneDay,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 6] = [
        TimeFrame::FiveMinutes,
        TimeFrame::FifteenMinutes,
        TimeFrame::ThirtyMinutes,
        TimeFrame::OneHour,
        TimeFrame::FourHours,
        TimeFrame::OneDay,
    ];

    /// Wire identifier, shared by the exchange API and the UI.
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::FiveMinutes => "5m",
            TimeFrame::FifteenMinutes => "15m",
            TimeFrame::ThirtyMinutes => "30m",
            TimeFrame::OneHour => "1h",
            TimeFrame::FourHours => "4h",
            TimeFrame::OneDay => "1d",
        }
    }

    /// Human-readable label for dropdowns.
    pub const fn label(&self) -> &'static str {
        match self {
            TimeFrame::FiveMinutes => "5 Minutes",
            TimeFrame::FifteenMinutes => "15 Minutes",
            TimeFrame::ThirtyMinutes => "30 Minutes",
            TimeFrame::OneHour => "1 Hour",
            TimeFrame::FourHours => "4 Hours",
            TimeFrame::OneDay => "1 Day",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeFrame::FiveMinutes => Duration::minutes(5),
            TimeFrame::FifteenMinutes => Duration::minutes(15),
            TimeFrame::ThirtyMinutes => Duration::minutes(30),
            TimeFrame::OneHour => Duration::hours(1),
            TimeFrame::FourHours => Duration::hours(4),
            TimeFrame::OneDay => Duration::days(1),
        }
    }

    /// Number of bars that fit in `days` whole days.
    pub fn bars_per_days(&self, days: u32) -> u32 {
        let per_day = Duration::days(1).num_minutes() / self.duration().num_minutes();
        (per_day as u32).saturating_mul(days)
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tf = match s.trim() {
            "5m" => TimeFrame::FiveMinutes,
            "15m" => TimeFrame::FifteenMinutes,
            "30m" => TimeFrame::ThirtyMinutes,
            "1h" => TimeFrame::OneHour,
            "4h" => TimeFrame::FourHours,
            "1d" => TimeFrame::OneDay,
            other => {
                return Err(TimeFrameError::InvalidTimeframe {
                    input: other.to_string(),
                });
            }
        };
        Ok(tf)
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = TimeFrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(tf: TimeFrame) -> Self {
        tf.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_identifier() {
        for tf in TimeFrame::ALL {
            assert_eq!(tf.as_str().parse::<TimeFrame>().unwrap(), tf);
        }
    }

    #[test]
    fn durations_match_identifiers() {
        assert_eq!(TimeFrame::FiveMinutes.duration(), Duration::minutes(5));
        assert_eq!(TimeFrame::FifteenMinutes.duration(), Duration::minutes(15));
        assert_eq!(TimeFrame::ThirtyMinutes.duration(), Duration::minutes(30));
        assert_eq!(TimeFrame::OneHour.duration(), Duration::hours(1));
        assert_eq!(TimeFrame::FourHours.duration(), Duration::hours(4));
        assert_eq!(TimeFrame::OneDay.duration(), Duration::days(1));
    }

    #[test]
    fn rejects_unknown_identifiers() {
        for bad in ["", "1m", "2h", "1w", "1M", "hour"] {
            let err = bad.parse::<TimeFrame>().unwrap_err();
            assert!(matches!(err, TimeFrameError::InvalidTimeframe { .. }), "{bad}");
        }
    }

    #[test]
    fn serde_uses_wire_identifier() {
        let json = serde_json::to_string(&TimeFrame::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let tf: TimeFrame = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(tf, TimeFrame::FifteenMinutes);
        assert!(serde_json::from_str::<TimeFrame>("\"3m\"").is_err());
    }

    #[test]
    fn bars_per_days_for_export_window() {
        assert_eq!(TimeFrame::FiveMinutes.bars_per_days(60), 17_280);
        assert_eq!(TimeFrame::OneDay.bars_per_days(60), 60);
    }
}
