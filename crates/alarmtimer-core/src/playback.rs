//! Alarm sound playback.
//!
//! The engine only sees [`SoundPlayer`]. The real implementation,
//! [`PlaybackHandle`], forwards requests over a channel to one dedicated
//! worker thread that owns the audio backend. Only one sound is active at a
//! time: a new `play` stops whatever is still playing.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::PlaybackError;

/// Capability the engine invokes when an alarm fires. Must not block.
pub trait SoundPlayer: Send {
    fn play(&self, sound: &str, file: &Path);

    fn stop(&self) {}
}

impl<P: SoundPlayer + ?Sized> SoundPlayer for Box<P> {
    fn play(&self, sound: &str, file: &Path) {
        (**self).play(sound, file);
    }

    fn stop(&self) {
        (**self).stop();
    }
}

/// Player that drops every request. Used when playback is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn play(&self, sound: &str, file: &Path) {
        debug!(sound, file = %file.display(), "playback disabled, ignoring alarm");
    }
}

/// Something that can actually make noise. Lives on the worker thread, so
/// it does not need to be `Send` itself.
pub trait AudioBackend {
    /// Start playing `file`. Returns once playback has begun.
    fn play(&mut self, file: &Path) -> Result<(), PlaybackError>;

    /// Silence the current sound, if any.
    fn stop(&mut self);

    /// Block until the current sound has finished.
    fn wait(&mut self) {}
}

/// Backend that only logs what it would play.
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, file: &Path) -> Result<(), PlaybackError> {
        tracing::info!(file = %file.display(), "alarm sound");
        Ok(())
    }

    fn stop(&mut self) {}
}

#[derive(Debug)]
enum Command {
    Play { sound: String, file: PathBuf },
    Stop,
    /// Let the current sound finish, then exit.
    Finish,
    Shutdown,
}

/// Cloneable sender side of the playback worker.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl PlaybackHandle {
    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("playback worker has exited, dropping request");
        }
    }
}

impl SoundPlayer for PlaybackHandle {
    fn play(&self, sound: &str, file: &Path) {
        self.send(Command::Play {
            sound: sound.to_string(),
            file: file.to_path_buf(),
        });
    }

    fn stop(&self) {
        self.send(Command::Stop);
    }
}

/// Owner of the worker thread. Dropping it stops playback and joins.
#[derive(Debug)]
pub struct PlaybackWorker {
    tx: mpsc::UnboundedSender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackWorker {
    /// Start the worker. `make_backend` runs on the worker thread.
    pub fn spawn<B, F>(make_backend: F) -> std::io::Result<(PlaybackHandle, PlaybackWorker)>
    where
        B: AudioBackend,
        F: FnOnce() -> B + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let thread = std::thread::Builder::new()
            .name("alarmtimer-playback".into())
            .spawn(move || run_worker(make_backend(), rx))?;
        Ok((
            PlaybackHandle { tx: tx.clone() },
            PlaybackWorker {
                tx,
                thread: Some(thread),
            },
        ))
    }

    /// Let the sound in flight play out, then stop the worker.
    pub fn finish(mut self) {
        let _ = self.tx.send(Command::Finish);
        self.join();
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("playback worker panicked");
            }
        }
    }
}

impl Drop for PlaybackWorker {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.tx.send(Command::Shutdown);
            self.join();
        }
    }
}

fn run_worker<B: AudioBackend>(mut backend: B, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Play { sound, file } => {
                backend.stop();
                match backend.play(&file) {
                    Ok(()) => debug!(sound = %sound, "playing"),
                    Err(e) => warn!(sound = %sound, error = %e, "alarm sound failed to play"),
                }
            }
            Command::Stop => backend.stop(),
            Command::Finish => {
                backend.wait();
                break;
            }
            Command::Shutdown => {
                backend.stop();
                break;
            }
        }
    }
}

/// Worker with the best backend compiled in: rodio when the `rodio` feature
/// is enabled, otherwise [`LogBackend`].
pub fn spawn_default(volume: u8) -> std::io::Result<(PlaybackHandle, PlaybackWorker)> {
    #[cfg(feature = "rodio")]
    {
        PlaybackWorker::spawn(move || rodio_backend::RodioBackend::new(volume))
    }
    #[cfg(not(feature = "rodio"))]
    {
        debug!(volume, "built without audio output, alarms are logged only");
        PlaybackWorker::spawn(|| LogBackend)
    }
}

#[cfg(feature = "rodio")]
pub mod rodio_backend {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::AudioBackend;
    use crate::error::PlaybackError;

    /// Plays files through the default output device.
    ///
    /// The device is opened on first use so a machine without audio can still
    /// run timers.
    pub struct RodioBackend {
        volume: f32,
        output: Option<(OutputStream, OutputStreamHandle)>,
        sink: Option<Sink>,
    }

    impl RodioBackend {
        pub fn new(volume: u8) -> Self {
            Self {
                volume: f32::from(volume.min(100)) / 100.0,
                output: None,
                sink: None,
            }
        }

        fn handle(&mut self) -> Result<&OutputStreamHandle, PlaybackError> {
            if self.output.is_none() {
                let output = OutputStream::try_default()
                    .map_err(|e| PlaybackError::Device(e.to_string()))?;
                self.output = Some(output);
            }
            match &self.output {
                Some((_, handle)) => Ok(handle),
                None => Err(PlaybackError::Device("no output stream".into())),
            }
        }
    }

    impl AudioBackend for RodioBackend {
        fn play(&mut self, file: &Path) -> Result<(), PlaybackError> {
            let reader = File::open(file).map_err(|source| PlaybackError::Open {
                path: file.to_path_buf(),
                source,
            })?;
            let source = Decoder::new(BufReader::new(reader)).map_err(|e| PlaybackError::Decode {
                path: file.to_path_buf(),
                message: e.to_string(),
            })?;
            let volume = self.volume;
            let sink = Sink::try_new(self.handle()?).map_err(|e| PlaybackError::Device(e.to_string()))?;
            sink.set_volume(volume);
            sink.append(source);
            self.sink = Some(sink);
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }

        fn wait(&mut self) {
            if let Some(sink) = &self.sink {
                sink.sleep_until_end();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<String>>>);

    struct RecordingBackend(Journal);

    impl AudioBackend for RecordingBackend {
        fn play(&mut self, file: &Path) -> Result<(), PlaybackError> {
            if file.ends_with("broken.wav") {
                return Err(PlaybackError::Decode {
                    path: file.to_path_buf(),
                    message: "bad header".into(),
                });
            }
            self.0 .0.lock().unwrap().push(format!("play {}", file.display()));
            Ok(())
        }

        fn stop(&mut self) {
            self.0 .0.lock().unwrap().push("stop".into());
        }

        fn wait(&mut self) {
            self.0 .0.lock().unwrap().push("wait".into());
        }
    }

    #[test]
    fn new_play_stops_previous() {
        let journal = Journal::default();
        let backend_journal = journal.clone();
        let (handle, worker) = PlaybackWorker::spawn(move || RecordingBackend(backend_journal)).unwrap();

        handle.play("bell", Path::new("/s/bell.wav"));
        handle.play("gong", Path::new("/s/gong.wav"));
        worker.finish();

        assert_eq!(
            *journal.0.lock().unwrap(),
            ["stop", "play /s/bell.wav", "stop", "play /s/gong.wav", "wait"]
        );
    }

    #[test]
    fn backend_errors_do_not_kill_worker() {
        let journal = Journal::default();
        let backend_journal = journal.clone();
        let (handle, worker) = PlaybackWorker::spawn(move || RecordingBackend(backend_journal)).unwrap();

        handle.play("broken", Path::new("/s/broken.wav"));
        handle.play("bell", Path::new("/s/bell.wav"));
        worker.finish();

        let log = journal.0.lock().unwrap();
        assert!(log.contains(&"play /s/bell.wav".to_string()));
    }

    #[test]
    fn drop_shuts_worker_down() {
        let journal = Journal::default();
        let backend_journal = journal.clone();
        let (handle, worker) = PlaybackWorker::spawn(move || RecordingBackend(backend_journal)).unwrap();
        drop(worker);

        // Requests after shutdown are dropped, not panics.
        handle.play("bell", Path::new("/s/bell.wav"));
        assert_eq!(*journal.0.lock().unwrap(), ["stop"]);
    }

    #[test]
    fn null_player_accepts_anything() {
        NullPlayer.play("bell", Path::new("/nowhere.wav"));
        NullPlayer.stop();
    }
}
