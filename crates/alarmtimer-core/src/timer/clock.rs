//! One-second clock used by the engine.
//!
//! The clock only counts; something external (see [`crate::driver`]) decides
//! when a second has passed and calls [`Clock::tick`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Countdown,
    Stopwatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Clock {
    /// Counts `remaining` down to zero.
    Countdown { duration: u64, remaining: u64 },
    /// Counts `elapsed` up without bound.
    Stopwatch { elapsed: u64 },
}

impl Clock {
    pub fn countdown(duration_secs: u64) -> Self {
        Clock::Countdown {
            duration: duration_secs,
            remaining: duration_secs,
        }
    }

    pub fn stopwatch() -> Self {
        Clock::Stopwatch { elapsed: 0 }
    }

    pub fn mode(&self) -> TimerMode {
        match self {
            Clock::Countdown { .. } => TimerMode::Countdown,
            Clock::Stopwatch { .. } => TimerMode::Stopwatch,
        }
    }

    /// Advance one second and return the new reading.
    pub fn tick(&mut self) -> u64 {
        match self {
            Clock::Countdown { remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                *remaining
            }
            Clock::Stopwatch { elapsed } => {
                *elapsed = elapsed.saturating_add(1);
                *elapsed
            }
        }
    }

    /// Remaining seconds for a countdown, elapsed seconds for a stopwatch.
    pub fn reading(&self) -> u64 {
        match *self {
            Clock::Countdown { remaining, .. } => remaining,
            Clock::Stopwatch { elapsed } => elapsed,
        }
    }

    /// Seconds since the run started, for either variant.
    pub fn elapsed(&self) -> u64 {
        match *self {
            Clock::Countdown { duration, remaining } => duration.saturating_sub(remaining),
            Clock::Stopwatch { elapsed } => elapsed,
        }
    }

    /// A countdown that has reached zero. Stopwatches never are.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Clock::Countdown { remaining: 0, .. })
    }

    /// Zero the reading. A countdown is left with nothing remaining.
    pub fn clear(&mut self) {
        match self {
            Clock::Countdown { duration, remaining } => {
                *duration = 0;
                *remaining = 0;
            }
            Clock::Stopwatch { elapsed } => *elapsed = 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_reaches_zero_and_clamps() {
        let mut clock = Clock::countdown(3);
        assert!(!clock.is_terminal());
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 0);
        assert!(clock.is_terminal());
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed(), 3);
    }

    #[test]
    fn stopwatch_counts_up_forever() {
        let mut clock = Clock::stopwatch();
        for _ in 0..500 {
            clock.tick();
        }
        assert_eq!(clock.reading(), 500);
        assert_eq!(clock.elapsed(), 500);
        assert!(!clock.is_terminal());
    }

    #[test]
    fn inconsistent_countdown_reports_zero_elapsed() {
        let clock: Clock =
            serde_json::from_str(r#"{"mode":"countdown","duration":1,"remaining":5}"#).unwrap();
        assert_eq!(clock.elapsed(), 0);
        assert_eq!(Clock::Countdown { duration: 1, remaining: 5 }.elapsed(), 0);
    }

    #[test]
    fn clear_zeroes_both_variants() {
        let mut cd = Clock::countdown(10);
        cd.tick();
        cd.clear();
        assert_eq!(cd.reading(), 0);
        assert_eq!(cd.elapsed(), 0);

        let mut sw = Clock::stopwatch();
        sw.tick();
        sw.clear();
        assert_eq!(sw.reading(), 0);
    }
}
