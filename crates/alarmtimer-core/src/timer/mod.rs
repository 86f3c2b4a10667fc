mod clock;
mod engine;
mod observer;
mod schedule;

pub use clock::{Clock, TimerMode};
pub use engine::{AlarmEngine, EngineConfig, Phase};
pub use schedule::{
    AlarmSchedule, AlarmSlot, AlarmSlots, AlarmTrigger, CustomAlarm, TriggerKind, ONE_MINUTE_SECS,
};
