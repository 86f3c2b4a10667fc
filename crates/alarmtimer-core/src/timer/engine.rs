//! Timer/alarm engine.
//!
//! The engine is a tick-driven state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` once per second
//! (see [`crate::driver`] for a ready-made loop).
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Stopped      (stop, reset, or countdown reaching zero)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = AlarmEngine::new(EngineConfig::countdown(120).end_alarm("gong"), player);
//! engine.start(&registry)?;
//! // Once per second:
//! engine.tick(&registry);
//! ```
//!
//! The registry is borrowed per call, never owned: alarms hold sound names
//! and are resolved at fire time, so a sound removed mid-run fires nothing.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::clock::{Clock, TimerMode};
use super::observer::Observers;
use super::schedule::{AlarmSchedule, AlarmSlots, AlarmTrigger, CustomAlarm};
use crate::error::ConfigError;
use crate::events::{EngineSnapshot, Event, FiredAlarm, TickUpdate};
use crate::playback::SoundPlayer;
use crate::sound::SoundRegistry;
use crate::time::{seconds_to_time, time_to_seconds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Stopped,
    Running,
}

/// What the next run should look like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: TimerMode,
    /// Countdown length, or the stopwatch's end-alarm offset (0 for none).
    pub duration_secs: u64,
    #[serde(default)]
    pub slots: AlarmSlots,
    #[serde(default)]
    pub custom: Vec<CustomAlarm>,
}

impl EngineConfig {
    pub fn countdown(duration_secs: u64) -> Self {
        Self {
            mode: TimerMode::Countdown,
            duration_secs,
            slots: AlarmSlots::default(),
            custom: Vec::new(),
        }
    }

    /// Countdown from `HH:MM:SS` text.
    pub fn countdown_from_text(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::countdown(time_to_seconds(text)?))
    }

    pub fn stopwatch() -> Self {
        Self {
            mode: TimerMode::Stopwatch,
            duration_secs: 0,
            slots: AlarmSlots::default(),
            custom: Vec::new(),
        }
    }

    /// Stopwatch whose end alarm fires after `limit_secs`.
    pub fn stopwatch_with_limit(limit_secs: u64) -> Self {
        Self {
            duration_secs: limit_secs,
            ..Self::stopwatch()
        }
    }

    pub fn start_alarm(mut self, sound: impl Into<String>) -> Self {
        self.slots.start = Some(sound.into());
        self
    }

    pub fn one_minute_alarm(mut self, sound: impl Into<String>) -> Self {
        self.slots.one_minute_before = Some(sound.into());
        self
    }

    pub fn end_alarm(mut self, sound: impl Into<String>) -> Self {
        self.slots.end = Some(sound.into());
        self
    }

    pub fn alarm_at(mut self, offset_secs: u64, sound: impl Into<String>) -> Self {
        self.custom.push(CustomAlarm {
            offset_secs,
            sound: sound.into(),
        });
        self
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.mode != TimerMode::Countdown {
            return Ok(());
        }
        let end_selected = self
            .slots
            .end
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !end_selected {
            return Err(ConfigError::MissingEndAlarm);
        }
        if self.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }
}

/// Core timer/alarm engine.
///
/// Commands return the events they produced; registered observers see the
/// same events as they are emitted.
pub struct AlarmEngine {
    config: EngineConfig,
    phase: Phase,
    clock: Clock,
    schedule: AlarmSchedule,
    /// Set by `stop()`, cleared by anything that ends the run for good.
    resumable: bool,
    player: Box<dyn SoundPlayer>,
    observers: Observers,
}

impl AlarmEngine {
    pub fn new(config: EngineConfig, player: impl SoundPlayer + 'static) -> Self {
        let clock = initial_clock(&config);
        Self {
            config,
            phase: Phase::Stopped,
            clock,
            schedule: AlarmSchedule::default(),
            resumable: false,
            player: Box::new(player),
            observers: Observers::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn mode(&self) -> TimerMode {
        self.config.mode
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Remaining seconds (countdown) or elapsed seconds (stopwatch).
    pub fn reading(&self) -> u64 {
        self.clock.reading()
    }

    pub fn elapsed(&self) -> u64 {
        self.clock.elapsed()
    }

    /// `reading()` as `HH:MM:SS`.
    pub fn display(&self) -> String {
        seconds_to_time(self.clock.reading())
    }

    pub fn schedule(&self) -> &AlarmSchedule {
        &self.schedule
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.config.mode,
            phase: self.phase,
            reading_secs: self.clock.reading(),
            configured_duration_secs: self.config.duration_secs,
            scheduled_alarms: self.schedule.len(),
            at: Utc::now(),
        }
    }

    // ── Observers ────────────────────────────────────────────────────

    pub fn on_tick(&mut self, f: impl FnMut(&TickUpdate) + Send + 'static) {
        self.observers.on_tick(f);
    }

    pub fn on_alarm_fired(&mut self, f: impl FnMut(&FiredAlarm) + Send + 'static) {
        self.observers.on_alarm_fired(f);
    }

    pub fn on_state_changed(&mut self, f: impl FnMut(&EngineSnapshot) + Send + 'static) {
        self.observers.on_state_changed(f);
    }

    /// Receive every event, whatever its kind.
    pub fn on_event(&mut self, f: impl FnMut(&Event) + Send + 'static) {
        self.observers.on_event(f);
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the configuration used by the next `start()`.
    pub fn configure(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        if self.is_running() {
            return Err(ConfigError::WhileRunning);
        }
        self.clock = initial_clock(&config);
        self.config = config;
        self.schedule = AlarmSchedule::default();
        self.resumable = false;
        Ok(())
    }

    /// Begin a fresh run from the current configuration.
    ///
    /// Alarms at offset zero fire before this returns. Starting while
    /// already running does nothing.
    pub fn start(&mut self, registry: &SoundRegistry) -> Result<Vec<Event>, ConfigError> {
        if self.is_running() {
            return Ok(Vec::new());
        }
        self.config.check()?;
        if self.config.mode == TimerMode::Countdown {
            if let Some(end) = self.config.slots.end.as_deref() {
                if !registry.contains(end) {
                    return Err(ConfigError::UnknownSound(end.trim().to_string()));
                }
            }
        }

        let cfg = &self.config;
        self.schedule =
            AlarmSchedule::build(cfg.mode, cfg.duration_secs, &cfg.slots, &cfg.custom, registry);
        self.clock = initial_clock(cfg);
        self.phase = Phase::Running;
        self.resumable = false;
        info!(
            mode = ?cfg.mode,
            duration_secs = cfg.duration_secs,
            alarms = self.schedule.len(),
            "timer started"
        );

        let mut events = Vec::new();
        self.emit(
            &mut events,
            Event::TimerStarted {
                mode: self.config.mode,
                duration_secs: self.config.duration_secs,
                alarms: self.schedule.len(),
                at: Utc::now(),
            },
        );
        self.emit_state(&mut events);
        self.fire_due(registry, &mut events);
        Ok(events)
    }

    /// Advance one second. Does nothing unless running.
    pub fn tick(&mut self, registry: &SoundRegistry) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }

        let reading = self.clock.tick();
        let update = TickUpdate {
            mode: self.config.mode,
            reading_secs: reading,
            elapsed_secs: self.clock.elapsed(),
            display: seconds_to_time(reading),
            at: Utc::now(),
        };
        self.emit(&mut events, Event::Tick(update));
        self.fire_due(registry, &mut events);

        if self.clock.is_terminal() {
            info!(duration_secs = self.config.duration_secs, "countdown finished");
            self.emit(
                &mut events,
                Event::TimerCompleted {
                    duration_secs: self.config.duration_secs,
                    at: Utc::now(),
                },
            );
            self.phase = Phase::Stopped;
            self.emit_state(&mut events);
        }
        events
    }

    /// Halt ticking, keeping the current reading.
    pub fn stop(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.is_running() {
            return events;
        }
        self.phase = Phase::Stopped;
        self.resumable = true;
        info!(reading_secs = self.clock.reading(), "timer stopped");
        self.emit(
            &mut events,
            Event::TimerStopped {
                reading_secs: self.clock.reading(),
                at: Utc::now(),
            },
        );
        self.emit_state(&mut events);
        events
    }

    /// Continue a stopped run from where it was halted.
    ///
    /// Only valid after `stop()`; the schedule built at start is kept.
    pub fn resume(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_running() || !self.resumable {
            return events;
        }
        self.phase = Phase::Running;
        self.resumable = false;
        debug!(reading_secs = self.clock.reading(), "timer resumed");
        self.emit(
            &mut events,
            Event::TimerResumed {
                reading_secs: self.clock.reading(),
                at: Utc::now(),
            },
        );
        self.emit_state(&mut events);
        events
    }

    /// Zero the displayed time and force `Stopped`, from any state.
    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.phase = Phase::Stopped;
        self.resumable = false;
        self.clock.clear();
        debug!("timer reset");
        self.emit(&mut events, Event::TimerReset { at: Utc::now() });
        self.emit_state(&mut events);
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fire_due(&mut self, registry: &SoundRegistry, events: &mut Vec<Event>) {
        let elapsed = self.clock.elapsed();
        let due: Vec<AlarmTrigger> = self.schedule.due(elapsed).cloned().collect();
        for trigger in due {
            let Some(file) = registry.resolve(&trigger.sound) else {
                warn!(sound = %trigger.sound, elapsed, "alarm sound no longer registered, skipping");
                continue;
            };
            debug!(sound = %trigger.sound, slot = ?trigger.slot, elapsed, "alarm fired");
            self.player.play(&trigger.sound, file);
            self.emit(
                events,
                Event::AlarmFired(FiredAlarm {
                    slot: trigger.slot,
                    sound: trigger.sound,
                    file: file.to_path_buf(),
                    elapsed_secs: elapsed,
                    at: Utc::now(),
                }),
            );
        }
    }

    fn emit_state(&mut self, events: &mut Vec<Event>) {
        let snapshot = self.snapshot();
        self.emit(events, Event::StateChanged(snapshot));
    }

    fn emit(&mut self, events: &mut Vec<Event>, event: Event) {
        self.observers.dispatch(&event);
        events.push(event);
    }
}

impl std::fmt::Debug for AlarmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlarmEngine")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("clock", &self.clock)
            .field("schedule", &self.schedule)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

fn initial_clock(config: &EngineConfig) -> Clock {
    match config.mode {
        TimerMode::Countdown => Clock::countdown(config.duration_secs),
        TimerMode::Stopwatch => Clock::stopwatch(),
    }
}
