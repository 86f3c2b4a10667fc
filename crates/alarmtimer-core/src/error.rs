//! Core error types for alarmtimer-core.
//!
//! Errors are split by concern (configuration, sound registry, persistence)
//! and gathered into [`CoreError`] for callers that do not care which layer
//! failed.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for alarmtimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sound registry errors
    #[error("Sound registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Storage errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
///
/// These block `start()` and are meant to be shown to the user.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Countdown started without an end alarm selected
    #[error("an end alarm sound must be selected before starting a countdown")]
    MissingEndAlarm,

    /// The selected end alarm names a sound that is not registered
    #[error("end alarm sound '{0}' is not registered")]
    UnknownSound(String),

    /// Countdown started with a zero duration
    #[error("countdown duration must be greater than zero")]
    ZeroDuration,

    /// Engine reconfigured while a run is in progress
    #[error("cannot change the timer configuration while it is running")]
    WhileRunning,

    /// Time text did not match the expected layout
    #[error("invalid time '{input}' (expected {expected})")]
    InvalidTime { input: String, expected: &'static str },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Sound registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("a sound named '{0}' already exists")]
    DuplicateName(String),

    #[error("no sound named '{0}'")]
    NotFound(String),

    #[error("sound name must not be empty")]
    EmptyName,

    /// Only mp3 and wav files can be imported
    #[error("unsupported sound file {0} (expected .mp3 or .wav)")]
    UnsupportedFormat(PathBuf),

    #[error("sound file {0} does not exist")]
    SourceMissing(PathBuf),

    /// Copying an imported file into the managed folder failed
    #[error("failed to copy {from} to {to}: {source}")]
    ImportFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Storage errors for the sound registry file.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but does not match the `{name, file}` record schema
    #[error("malformed sound list in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode sound list: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Audio playback errors. Reported by the playback worker, never propagated
/// into the tick path.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("audio output unavailable: {0}")]
    Device(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
