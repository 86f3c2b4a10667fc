//! Integration tests for the full alarm workflow: sounds imported into a data
//! directory, an engine built from saved configuration, and alarms reaching a
//! playback backend.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alarmtimer_core::playback::{AudioBackend, PlaybackWorker};
use alarmtimer_core::{
    run_until_stopped, AlarmEngine, Config, DriveOutcome, EngineConfig, Event, Phase,
    PlaybackError, SoundRegistry, SoundStore,
};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Played(Arc<Mutex<Vec<PathBuf>>>);

struct CollectingBackend(Played);

impl AudioBackend for CollectingBackend {
    fn play(&mut self, file: &Path) -> Result<(), PlaybackError> {
        self.0 .0.lock().unwrap().push(file.to_path_buf());
        Ok(())
    }

    fn stop(&mut self) {}
}

fn write_sound(dir: &Path, file_name: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, b"RIFF").unwrap();
    path
}

#[tokio::test(start_paused = true)]
async fn test_countdown_plays_imported_sounds() {
    let data = TempDir::new().unwrap();
    let downloads = TempDir::new().unwrap();

    let mut registry = SoundRegistry::open(SoundStore::in_dir(data.path()));
    registry.import("bell", &write_sound(downloads.path(), "bell.wav")).unwrap();
    registry.import("gong", &write_sound(downloads.path(), "gong.mp3")).unwrap();

    let config_path = data.path().join("config.toml");
    let mut config = Config::load_from(&config_path).unwrap();
    config.set("alarms.start", "bell").unwrap();
    config.set("alarms.end", "gong").unwrap();
    config.save_to(&config_path).unwrap();
    let config = Config::load_from(&config_path).unwrap();

    let played = Played::default();
    let backend_played = played.clone();
    let (handle, worker) = PlaybackWorker::spawn(move || CollectingBackend(backend_played)).unwrap();

    let mut engine = AlarmEngine::new(config.countdown(5), handle);
    let events = Arc::new(Mutex::new(Vec::new()));
    {
        let events = events.clone();
        engine.on_event(move |e| events.lock().unwrap().push(e.kind()));
    }

    engine.start(&registry).unwrap();
    let outcome = run_until_stopped(&mut engine, &registry, std::future::pending()).await;
    assert_eq!(outcome, DriveOutcome::Finished);
    worker.finish();

    let managed = data.path().join(SoundStore::SOUNDS_DIR);
    assert_eq!(
        *played.0.lock().unwrap(),
        [managed.join("bell.wav"), managed.join("gong.mp3")]
    );

    let kinds = events.lock().unwrap();
    assert_eq!(kinds.iter().filter(|k| **k == "tick").count(), 5);
    assert_eq!(kinds.last(), Some(&"state_changed"));
    assert!(kinds.contains(&"timer_completed"));
}

#[test]
fn test_registry_survives_restart_and_drives_schedule() {
    let data = TempDir::new().unwrap();
    {
        let mut registry = SoundRegistry::open(SoundStore::in_dir(data.path()));
        registry.add("bell", "/sounds/bell.wav").unwrap();
        registry.add("beep", "/sounds/beep.wav").unwrap();
        registry.add("gong", "/sounds/gong.wav").unwrap();
    }

    let registry = SoundRegistry::open(SoundStore::in_dir(data.path()));
    let mut engine = AlarmEngine::new(
        EngineConfig::countdown(600)
            .start_alarm("bell")
            .one_minute_alarm("beep")
            .end_alarm("gong"),
        alarmtimer_core::NullPlayer,
    );
    engine.start(&registry).unwrap();
    assert_eq!(engine.schedule().offsets(), vec![0, 540, 600]);
}

#[test]
fn test_deleted_sound_mid_run_is_silent() {
    let data = TempDir::new().unwrap();
    let mut registry = SoundRegistry::open(SoundStore::in_dir(data.path()));
    registry.add("gong", "/sounds/gong.wav").unwrap();
    registry.add("beep", "/sounds/beep.wav").unwrap();

    let mut engine = AlarmEngine::new(
        EngineConfig::countdown(61).one_minute_alarm("beep").end_alarm("gong"),
        alarmtimer_core::NullPlayer,
    );
    engine.start(&registry).unwrap();
    registry.remove("beep").unwrap();

    let mut fired = Vec::new();
    for _ in 0..61 {
        for event in engine.tick(&registry) {
            if let Event::AlarmFired(alarm) = event {
                fired.push(alarm.sound);
            }
        }
    }
    assert_eq!(fired, ["gong"]);
    assert_eq!(engine.phase(), Phase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_stopwatch_cancelled_by_caller() {
    let registry = SoundRegistry::in_memory();
    let mut engine = AlarmEngine::new(EngineConfig::stopwatch(), alarmtimer_core::NullPlayer);
    engine.start(&registry).unwrap();

    let outcome = run_until_stopped(
        &mut engine,
        &registry,
        tokio::time::sleep(Duration::from_millis(120_500)),
    )
    .await;

    assert_eq!(outcome, DriveOutcome::Cancelled);
    assert_eq!(engine.reading(), 120);
    assert_eq!(engine.display(), "00:02:00");
}
