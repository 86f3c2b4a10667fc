//! Once-per-second tick loop for an [`AlarmEngine`].

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::sound::SoundRegistry;
use crate::timer::AlarmEngine;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How a driven run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The engine stopped by itself (countdown reached zero) or was not running.
    Finished,
    /// `shutdown` resolved first; the engine was stopped.
    Cancelled,
}

/// Tick `engine` every second until it stops or `shutdown` resolves.
///
/// Late ticks are delayed rather than bursted, so a stalled host never fires
/// several seconds' worth of alarms at once.
pub async fn run_until_stopped<F>(
    engine: &mut AlarmEngine,
    registry: &SoundRegistry,
    shutdown: F,
) -> DriveOutcome
where
    F: Future<Output = ()>,
{
    if !engine.is_running() {
        return DriveOutcome::Finished;
    }

    let mut ticker = interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the run already started.
    ticker.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!(reading_secs = engine.reading(), "tick loop cancelled");
                engine.stop();
                return DriveOutcome::Cancelled;
            }
            _ = ticker.tick() => {
                engine.tick(registry);
                if !engine.is_running() {
                    return DriveOutcome::Finished;
                }
            }
        }
    }
}
