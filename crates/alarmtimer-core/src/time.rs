//! Conversions between clock text and whole seconds.
//!
//! Two text layouts cross the presentation boundary: the canonical
//! `HH:MM:SS` used by [`time_to_seconds`] / [`seconds_to_time`], and the
//! user-selectable display formats in [`TimeFormat`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Parse `HH:MM:SS` into seconds.
///
/// Hours are not capped at 23 so that every value produced by
/// [`seconds_to_time`] parses back to the same number.
pub fn time_to_seconds(text: &str) -> Result<u64, ConfigError> {
    let parts = split_digits(text, 3, "HH:MM:SS")?;
    combine(text, "HH:MM:SS", &parts)
}

/// Render seconds as zero-padded `HH:MM:SS`. Hours widen past two digits.
pub fn seconds_to_time(secs: u64) -> String {
    let (h, rem) = (secs / 3600, secs % 3600);
    format!("{:02}:{:02}:{:02}", h, rem / 60, rem % 60)
}

/// Display/input layout chosen by the user.
///
/// Deserialization goes through [`FromStr`](std::str::FromStr), so the
/// pattern is matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TimeFormat {
    #[serde(rename = "mm:ss")]
    #[default]
    MinutesSeconds,
    #[serde(rename = "hh:mm:ss")]
    HoursMinutesSeconds,
}

impl TimeFormat {
    pub fn pattern(self) -> &'static str {
        match self {
            TimeFormat::MinutesSeconds => "mm:ss",
            TimeFormat::HoursMinutesSeconds => "hh:mm:ss",
        }
    }

    /// Parse user-typed time in this layout.
    ///
    /// Minutes and seconds must be below 60; the leading field is unbounded.
    pub fn parse(self, text: &str) -> Result<u64, ConfigError> {
        match self {
            TimeFormat::MinutesSeconds => {
                let p = split_digits(text, 2, self.pattern())?;
                check_sexagesimal(text, self.pattern(), &p[1..])?;
                combine(text, self.pattern(), &p)
            }
            TimeFormat::HoursMinutesSeconds => {
                let p = split_digits(text, 3, self.pattern())?;
                check_sexagesimal(text, self.pattern(), &p[1..])?;
                combine(text, self.pattern(), &p)
            }
        }
    }

    /// Render seconds in this layout. `mm:ss` folds hours into the minutes.
    pub fn format(self, secs: u64) -> String {
        match self {
            TimeFormat::MinutesSeconds => format!("{:02}:{:02}", secs / 60, secs % 60),
            TimeFormat::HoursMinutesSeconds => seconds_to_time(secs),
        }
    }
}

impl std::str::FromStr for TimeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm:ss" => Ok(TimeFormat::MinutesSeconds),
            "hh:mm:ss" => Ok(TimeFormat::HoursMinutesSeconds),
            other => Err(ConfigError::InvalidValue {
                key: "display.time_format".into(),
                message: format!("'{other}' is not one of mm:ss, hh:mm:ss"),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for TimeFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pattern())
    }
}

fn split_digits(text: &str, count: usize, expected: &'static str) -> Result<Vec<u64>, ConfigError> {
    let invalid = || ConfigError::InvalidTime {
        input: text.to_string(),
        expected,
    };
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() != count {
        return Err(invalid());
    }
    parts
        .iter()
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            p.parse::<u64>().map_err(|_| invalid())
        })
        .collect()
}

/// Fold base-60 fields (most significant first) into seconds.
fn combine(text: &str, expected: &'static str, fields: &[u64]) -> Result<u64, ConfigError> {
    fields
        .iter()
        .try_fold(0u64, |acc, &v| acc.checked_mul(60)?.checked_add(v))
        .ok_or_else(|| ConfigError::InvalidTime {
            input: text.to_string(),
            expected,
        })
}

fn check_sexagesimal(text: &str, expected: &'static str, fields: &[u64]) -> Result<(), ConfigError> {
    if fields.iter().any(|&v| v >= 60) {
        return Err(ConfigError::InvalidTime {
            input: text.to_string(),
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_canonical_text() {
        assert_eq!(time_to_seconds("00:02:00").unwrap(), 120);
        assert_eq!(time_to_seconds("01:00:01").unwrap(), 3601);
        assert_eq!(time_to_seconds("123:00:00").unwrap(), 123 * 3600);
    }

    #[test]
    fn formats_with_padding() {
        assert_eq!(seconds_to_time(0), "00:00:00");
        assert_eq!(seconds_to_time(59), "00:00:59");
        assert_eq!(seconds_to_time(3661), "01:01:01");
        assert_eq!(seconds_to_time(360_000), "100:00:00");
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["", "12:00", "aa:bb:cc", "1:2:3:4", "-1:00:00", "01::00", "01:00: 0"] {
            assert!(time_to_seconds(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn minutes_seconds_layout() {
        let f = TimeFormat::MinutesSeconds;
        assert_eq!(f.parse("05:30").unwrap(), 330);
        assert!(f.parse("00:05:30").is_err());
        assert!(f.parse("05:75").is_err());
        assert_eq!(f.format(330), "05:30");
        assert_eq!(f.format(3700), "61:40");
    }

    #[test]
    fn hours_minutes_seconds_layout() {
        let f = TimeFormat::HoursMinutesSeconds;
        assert_eq!(f.parse("01:05:30").unwrap(), 3930);
        assert!(f.parse("05:30").is_err());
        assert!(f.parse("00:60:00").is_err());
        assert_eq!(f.format(3930), "01:05:30");
    }

    #[test]
    fn time_format_from_str() {
        assert_eq!("mm:ss".parse::<TimeFormat>().unwrap(), TimeFormat::MinutesSeconds);
        assert_eq!("HH:MM:SS".parse::<TimeFormat>().unwrap(), TimeFormat::HoursMinutesSeconds);
        assert!("ss".parse::<TimeFormat>().is_err());
    }

    proptest! {
        #[test]
        fn text_round_trip(secs in 0u64..10_000_000_000) {
            prop_assert_eq!(time_to_seconds(&seconds_to_time(secs)).unwrap(), secs);
        }

        #[test]
        fn display_round_trip(secs in 0u64..1_000_000) {
            let f = TimeFormat::HoursMinutesSeconds;
            prop_assert_eq!(f.parse(&f.format(secs)).unwrap(), secs);
        }
    }
}
