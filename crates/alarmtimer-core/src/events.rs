use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{AlarmSlot, Phase, TimerMode};

/// Every state change in the engine produces an Event.
/// Commands return the events they caused; observers receive them as they
/// happen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        duration_secs: u64,
        alarms: usize,
        at: DateTime<Utc>,
    },
    Tick(TickUpdate),
    AlarmFired(FiredAlarm),
    /// Countdown reached zero.
    TimerCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        reading_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        reading_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateChanged(EngineSnapshot),
}

/// Clock reading after one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickUpdate {
    pub mode: TimerMode,
    /// Remaining seconds (countdown) or elapsed seconds (stopwatch).
    pub reading_secs: u64,
    pub elapsed_secs: u64,
    /// `reading_secs` as `HH:MM:SS`.
    pub display: String,
    pub at: DateTime<Utc>,
}

/// A trigger whose sound resolved and was handed to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredAlarm {
    pub slot: AlarmSlot,
    pub sound: String,
    pub file: PathBuf,
    pub elapsed_secs: u64,
    pub at: DateTime<Utc>,
}

/// Full engine state, sent after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub mode: TimerMode,
    pub phase: Phase,
    pub reading_secs: u64,
    pub configured_duration_secs: u64,
    pub scheduled_alarms: usize,
    pub at: DateTime<Utc>,
}

impl Event {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::Tick(_) => "tick",
            Event::AlarmFired(_) => "alarm_fired",
            Event::TimerCompleted { .. } => "timer_completed",
            Event::TimerStopped { .. } => "timer_stopped",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::TimerReset { .. } => "timer_reset",
            Event::StateChanged(_) => "state_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::AlarmFired(FiredAlarm {
            slot: AlarmSlot::End,
            sound: "gong".into(),
            file: PathBuf::from("/s/gong.wav"),
            elapsed_secs: 120,
            at: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "alarm_fired");
        assert_eq!(json["slot"], "end");
        assert_eq!(json["sound"], "gong");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "alarm_fired");
    }
}
