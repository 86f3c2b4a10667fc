use alarmtimer_core::playback::{spawn_default, PlaybackWorker};
use alarmtimer_core::storage::sound_store;
use alarmtimer_core::{
    run_until_stopped, time_to_seconds, AlarmEngine, Config, ConfigError, DriveOutcome,
    EngineConfig, Event, NullPlayer, SoundPlayer, SoundRegistry, TimeFormat,
};
use clap::Args;

/// Sound selections shared by both run modes.
#[derive(Args)]
pub struct AlarmArgs {
    /// Sound played when the run starts
    #[arg(long)]
    start: Option<String>,
    /// Sound played one minute before the end (every minute for a stopwatch)
    #[arg(long = "one-minute")]
    one_minute: Option<String>,
    /// Sound played at the end
    #[arg(long)]
    end: Option<String>,
    /// Extra alarm as OFFSET=SOUND, OFFSET in seconds or HH:MM:SS from the start
    #[arg(long = "alarm", value_name = "OFFSET=SOUND")]
    alarms: Vec<String>,
    /// Do not play any sound
    #[arg(long)]
    silent: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
pub struct CountdownArgs {
    /// Duration as mm:ss or hh:mm:ss
    duration: String,
    #[command(flatten)]
    alarms: AlarmArgs,
}

#[derive(Args)]
pub struct StopwatchArgs {
    /// Fire the end alarm after this long (mm:ss or hh:mm:ss)
    #[arg(long)]
    limit: Option<String>,
    #[command(flatten)]
    alarms: AlarmArgs,
}

pub fn countdown(args: CountdownArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let secs = parse_duration(&args.duration, config.display.time_format)?;
    let engine_config = args.alarms.apply(config.countdown(secs))?;
    drive(&config, engine_config, &args.alarms)
}

pub fn stopwatch(args: StopwatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let limit = match &args.limit {
        Some(text) => parse_duration(text, config.display.time_format)?,
        None => 0,
    };
    let engine_config = args.alarms.apply(config.stopwatch(limit))?;
    drive(&config, engine_config, &args.alarms)
}

impl AlarmArgs {
    fn apply(&self, mut cfg: EngineConfig) -> Result<EngineConfig, ConfigError> {
        if let Some(name) = &self.start {
            cfg = cfg.start_alarm(name.clone());
        }
        if let Some(name) = &self.one_minute {
            cfg = cfg.one_minute_alarm(name.clone());
        }
        if let Some(name) = &self.end {
            cfg = cfg.end_alarm(name.clone());
        }
        for entry in &self.alarms {
            let (offset, sound) = parse_alarm(entry)?;
            cfg = cfg.alarm_at(offset, sound);
        }
        Ok(cfg)
    }
}

fn drive(
    config: &Config,
    engine_config: EngineConfig,
    args: &AlarmArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = SoundRegistry::open(sound_store()?);

    let (player, worker): (Box<dyn SoundPlayer>, Option<PlaybackWorker>) =
        if config.playback.enabled && !args.silent {
            let (handle, worker) = spawn_default(config.playback.volume)?;
            (Box::new(handle) as Box<dyn SoundPlayer>, Some(worker))
        } else {
            (Box::new(NullPlayer) as Box<dyn SoundPlayer>, None)
        };

    let mut engine = AlarmEngine::new(engine_config, player);
    engine.on_event(printer(args.json, config.display.time_format));
    engine.start(&registry)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(run_until_stopped(&mut engine, &registry, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }));

    match (outcome, worker) {
        // Let the end alarm ring out before exiting.
        (DriveOutcome::Finished, Some(worker)) => worker.finish(),
        (_, worker) => drop(worker),
    }
    Ok(())
}

fn printer(json: bool, format: TimeFormat) -> impl FnMut(&Event) + Send + 'static {
    move |event| {
        if json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "cannot encode event"),
            }
            return;
        }
        match event {
            Event::TimerStarted { mode, duration_secs, alarms, .. } => {
                println!("{mode:?} started ({}, {alarms} alarms)", format.format(*duration_secs));
            }
            Event::Tick(update) => println!("{}", format.format(update.reading_secs)),
            Event::AlarmFired(alarm) => println!("alarm: {} ({:?})", alarm.sound, alarm.slot),
            Event::TimerCompleted { .. } => println!("time is up"),
            Event::TimerStopped { reading_secs, .. } => {
                println!("stopped at {}", format.format(*reading_secs));
            }
            _ => {}
        }
    }
}

/// Accept the configured layout, falling back to canonical `HH:MM:SS`.
fn parse_duration(text: &str, format: TimeFormat) -> Result<u64, ConfigError> {
    format.parse(text).or_else(|err| time_to_seconds(text).map_err(|_| err))
}

fn parse_alarm(entry: &str) -> Result<(u64, String), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        key: "alarm".into(),
        message: format!("'{entry}' is not OFFSET=SOUND"),
    };
    let (offset, sound) = entry.split_once('=').ok_or_else(invalid)?;
    let sound = sound.trim();
    if sound.is_empty() {
        return Err(invalid());
    }
    let offset = offset.trim();
    let secs = match offset.parse::<u64>() {
        Ok(secs) => secs,
        Err(_) => parse_duration(offset, TimeFormat::MinutesSeconds)?,
    };
    Ok((secs, sound.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_accept_both_layouts() {
        assert_eq!(parse_duration("02:00", TimeFormat::MinutesSeconds).unwrap(), 120);
        assert_eq!(parse_duration("00:02:00", TimeFormat::MinutesSeconds).unwrap(), 120);
        assert_eq!(parse_duration("01:00:00", TimeFormat::HoursMinutesSeconds).unwrap(), 3600);
        assert!(parse_duration("two minutes", TimeFormat::MinutesSeconds).is_err());
    }

    #[test]
    fn alarm_specs() {
        assert_eq!(parse_alarm("30=bell").unwrap(), (30, "bell".to_string()));
        assert_eq!(parse_alarm("01:30=gong").unwrap(), (90, "gong".to_string()));
        assert_eq!(parse_alarm("00:01:30 = gong").unwrap(), (90, "gong".to_string()));
        assert!(parse_alarm("30").is_err());
        assert!(parse_alarm("30=").is_err());
        assert!(parse_alarm("x=bell").is_err());
    }
}
