use serde::{Deserialize, Serialize};
use tracing::warn;

use super::clock::TimerMode;
use crate::sound::SoundRegistry;

/// Seconds before the end at which the one-minute warning fires.
pub const ONE_MINUTE_SECS: u64 = 60;

/// Which configured slot produced a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmSlot {
    Start,
    OneMinuteBefore,
    End,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires when elapsed seconds equal the offset.
    Once,
    /// Fires whenever elapsed seconds are a non-zero multiple of the offset.
    Every,
}

/// A scheduled `(offset, sound)` pair.
///
/// `sound` is a registry name, looked up again when the trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmTrigger {
    pub offset_secs: u64,
    pub sound: String,
    pub slot: AlarmSlot,
    pub kind: TriggerKind,
}

impl AlarmTrigger {
    pub fn once(offset_secs: u64, sound: impl Into<String>, slot: AlarmSlot) -> Self {
        Self {
            offset_secs,
            sound: sound.into(),
            slot,
            kind: TriggerKind::Once,
        }
    }

    pub fn every(period_secs: u64, sound: impl Into<String>, slot: AlarmSlot) -> Self {
        Self {
            offset_secs: period_secs,
            sound: sound.into(),
            slot,
            kind: TriggerKind::Every,
        }
    }

    /// Whether this trigger fires at `elapsed` seconds into the run.
    pub fn matches(&self, elapsed: u64) -> bool {
        match self.kind {
            TriggerKind::Once => elapsed == self.offset_secs,
            TriggerKind::Every => {
                self.offset_secs != 0 && elapsed != 0 && elapsed % self.offset_secs == 0
            }
        }
    }
}

/// Sound names selected for the three fixed slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSlots {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub one_minute_before: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// A user-added alarm at an arbitrary offset from the start of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAlarm {
    pub offset_secs: u64,
    pub sound: String,
}

/// Ordered triggers for one run, rebuilt on every start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSchedule {
    pub triggers: Vec<AlarmTrigger>,
}

impl AlarmSchedule {
    /// Build the triggers for a run of `duration_secs` in `mode`.
    ///
    /// Slots naming a sound the registry cannot resolve are left out.
    /// In countdown mode the one-minute warning needs at least a minute of
    /// duration; in stopwatch mode it repeats every minute instead.
    pub fn build(
        mode: TimerMode,
        duration_secs: u64,
        slots: &AlarmSlots,
        custom: &[CustomAlarm],
        registry: &SoundRegistry,
    ) -> Self {
        let usable = |slot: AlarmSlot, name: &str| -> Option<String> {
            if registry.contains(name) {
                return Some(name.to_string());
            }
            warn!(sound = name, ?slot, "alarm sound not registered, leaving it out");
            None
        };
        let pick = |slot: AlarmSlot, name: &Option<String>| name.as_deref().and_then(|n| usable(slot, n));
        let mut triggers = Vec::new();

        if let Some(sound) = pick(AlarmSlot::Start, &slots.start) {
            triggers.push(AlarmTrigger::once(0, sound, AlarmSlot::Start));
        }
        if let Some(sound) = pick(AlarmSlot::OneMinuteBefore, &slots.one_minute_before) {
            match mode {
                TimerMode::Countdown => {
                    if let Some(offset) = duration_secs.checked_sub(ONE_MINUTE_SECS) {
                        triggers.push(AlarmTrigger::once(offset, sound, AlarmSlot::OneMinuteBefore));
                    }
                }
                TimerMode::Stopwatch => {
                    triggers.push(AlarmTrigger::every(
                        ONE_MINUTE_SECS,
                        sound,
                        AlarmSlot::OneMinuteBefore,
                    ));
                }
            }
        }
        if let Some(sound) = pick(AlarmSlot::End, &slots.end) {
            if mode == TimerMode::Countdown || duration_secs > 0 {
                triggers.push(AlarmTrigger::once(duration_secs, sound, AlarmSlot::End));
            }
        }
        for alarm in custom {
            if let Some(sound) = usable(AlarmSlot::Custom, &alarm.sound) {
                triggers.push(AlarmTrigger::once(alarm.offset_secs, sound, AlarmSlot::Custom));
            }
        }

        Self { triggers }
    }

    /// Triggers due at `elapsed` seconds, in schedule order. Ties all fire.
    pub fn due(&self, elapsed: u64) -> impl Iterator<Item = &AlarmTrigger> {
        self.triggers.iter().filter(move |t| t.matches(elapsed))
    }

    /// Offsets of the single-shot triggers, in schedule order.
    pub fn offsets(&self) -> Vec<u64> {
        self.triggers
            .iter()
            .filter(|t| t.kind == TriggerKind::Once)
            .map(|t| t.offset_secs)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SoundRegistry {
        let mut reg = SoundRegistry::in_memory();
        for name in ["bell", "beep", "gong"] {
            reg.add(name, format!("/s/{name}.wav")).unwrap();
        }
        reg
    }

    fn all_slots() -> AlarmSlots {
        AlarmSlots {
            start: Some("bell".into()),
            one_minute_before: Some("beep".into()),
            end: Some("gong".into()),
        }
    }

    #[test]
    fn countdown_with_all_slots() {
        for d in [60, 61, 120, 3600] {
            let s = AlarmSchedule::build(TimerMode::Countdown, d, &all_slots(), &[], &registry());
            assert_eq!(s.offsets(), vec![0, d - 60, d]);
        }
    }

    #[test]
    fn short_countdown_omits_one_minute_warning() {
        for d in [1, 30, 59] {
            let s = AlarmSchedule::build(TimerMode::Countdown, d, &all_slots(), &[], &registry());
            assert_eq!(s.offsets(), vec![0, d]);
        }
    }

    #[test]
    fn unresolvable_slots_are_skipped() {
        let slots = AlarmSlots {
            start: Some("missing".into()),
            one_minute_before: None,
            end: Some("gong".into()),
        };
        let s = AlarmSchedule::build(TimerMode::Countdown, 120, &slots, &[], &registry());
        assert_eq!(s.triggers, vec![AlarmTrigger::once(120, "gong", AlarmSlot::End)]);
    }

    #[test]
    fn stopwatch_one_minute_repeats() {
        let s = AlarmSchedule::build(TimerMode::Stopwatch, 0, &all_slots(), &[], &registry());
        assert_eq!(s.len(), 2);
        assert_eq!(s.due(0).count(), 1);
        assert_eq!(s.due(60).count(), 1);
        assert_eq!(s.due(61).count(), 0);
        assert_eq!(s.due(180).count(), 1);
    }

    #[test]
    fn stopwatch_end_needs_a_limit() {
        let s = AlarmSchedule::build(TimerMode::Stopwatch, 90, &all_slots(), &[], &registry());
        let end: Vec<_> = s.triggers.iter().filter(|t| t.slot == AlarmSlot::End).collect();
        assert_eq!(end.len(), 1);
        assert_eq!(end[0].offset_secs, 90);
    }

    #[test]
    fn ties_all_fire_in_order() {
        let custom = vec![
            CustomAlarm { offset_secs: 30, sound: "bell".into() },
            CustomAlarm { offset_secs: 30, sound: "gong".into() },
            CustomAlarm { offset_secs: 45, sound: "nope".into() },
        ];
        let s = AlarmSchedule::build(TimerMode::Countdown, 60, &AlarmSlots::default(), &custom, &registry());
        let due: Vec<_> = s.due(30).map(|t| t.sound.as_str()).collect();
        assert_eq!(due, ["bell", "gong"]);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn zero_period_never_fires() {
        let t = AlarmTrigger::every(0, "bell", AlarmSlot::Custom);
        assert!(!t.matches(0));
        assert!(!t.matches(60));
    }
}
