mod config;

pub use config::{Config, DisplayConfig, PlaybackConfig};

use std::path::PathBuf;

use crate::sound::SoundStore;

/// Returns the application data directory, creating it if needed.
///
/// `ALARMTIMER_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/alarmtimer[-dev]/`, with the `-dev` suffix when
/// `ALARMTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("ALARMTIMER_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("ALARMTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("alarmtimer-dev")
            } else {
                base_dir.join("alarmtimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Sound registry store inside [`data_dir`].
pub fn sound_store() -> std::io::Result<SoundStore> {
    Ok(SoundStore::in_dir(&data_dir()?))
}
