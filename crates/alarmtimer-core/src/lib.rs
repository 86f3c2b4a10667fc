//! # alarmtimer Core Library
//!
//! Countdown timer and stopwatch with sound alarms. All logic lives here; the
//! `alarmtimer` CLI (or any GUI) is a thin presentation layer that drives the
//! engine and renders the events it emits.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven Stopped/Running state machine that
//!   requires the caller to invoke `tick()` once per second
//! - **Alarm Schedule**: `(offset, sound)` triggers rebuilt on every start
//! - **Sound Registry**: named sound files, persisted as a JSON list
//! - **Playback**: a single worker thread that plays one sound at a time
//! - **Storage**: data directory and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`AlarmEngine`]: Core timer state machine
//! - [`SoundRegistry`]: Sound catalog with write-through persistence
//! - [`PlaybackWorker`]: Background audio playback
//! - [`Config`]: Application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod playback;
pub mod sound;
pub mod storage;
pub mod time;
pub mod timer;

pub use driver::{run_until_stopped, DriveOutcome};
pub use error::{ConfigError, CoreError, PersistenceError, PlaybackError, RegistryError};
pub use events::{EngineSnapshot, Event, FiredAlarm, TickUpdate};
pub use playback::{NullPlayer, PlaybackHandle, PlaybackWorker, SoundPlayer};
pub use sound::{SoundEntry, SoundRegistry, SoundStore};
pub use storage::Config;
pub use time::{seconds_to_time, time_to_seconds, TimeFormat};
pub use timer::{AlarmEngine, AlarmSchedule, AlarmSlots, AlarmTrigger, EngineConfig, Phase, TimerMode};
