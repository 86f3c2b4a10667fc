//! JSON snapshot file backing the sound registry.
//!
//! The file holds the complete registry as an array of `{name, file}`
//! records and is rewritten in full on every mutation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::registry::SoundEntry;
use crate::error::PersistenceError;

/// Location of the registry file and the managed folder for imported sounds.
#[derive(Debug, Clone)]
pub struct SoundStore {
    file: PathBuf,
    sounds_dir: PathBuf,
}

impl SoundStore {
    pub const FILE_NAME: &'static str = "sounds.json";
    pub const SOUNDS_DIR: &'static str = "user_sounds";

    /// Store rooted at `dir`: `dir/sounds.json` and `dir/user_sounds/`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            file: dir.join(Self::FILE_NAME),
            sounds_dir: dir.join(Self::SOUNDS_DIR),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn sounds_dir(&self) -> &Path {
        &self.sounds_dir
    }

    /// Read the snapshot. A missing file is an empty registry.
    pub fn load(&self) -> Result<Vec<SoundEntry>, PersistenceError> {
        let content = match fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::ReadFailed {
                    path: self.file.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|source| PersistenceError::Malformed {
            path: self.file.clone(),
            source,
        })
    }

    /// Replace the snapshot with `entries`.
    ///
    /// Writes a sibling temp file and renames it over the target so a failed
    /// write never leaves a truncated list behind.
    pub fn save(&self, entries: &[SoundEntry]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(entries).map_err(PersistenceError::Encode)?;
        let write_failed = |source| PersistenceError::WriteFailed {
            path: self.file.clone(),
            source,
        };

        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let tmp = self.file.with_extension("json.tmp");
        let mut out = fs::File::create(&tmp).map_err(write_failed)?;
        out.write_all(json.as_bytes()).map_err(write_failed)?;
        out.sync_all().map_err(write_failed)?;
        drop(out);
        fs::rename(&tmp, &self.file).map_err(write_failed)?;
        Ok(())
    }

    /// Create the managed sounds folder if needed.
    pub fn ensure_sounds_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.sounds_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, file: &str) -> SoundEntry {
        SoundEntry {
            name: name.into(),
            file: PathBuf::from(file),
        }
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SoundStore::in_dir(dir.path());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = SoundStore::in_dir(dir.path());
        let entries = vec![entry("gong", "/s/gong.wav"), entry("bell", "/s/bell.mp3")];
        store.save(&entries).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, entries);
        assert!(!dir.path().join("sounds.json.tmp").exists());
    }

    #[test]
    fn file_uses_name_and_file_keys() {
        let dir = TempDir::new().unwrap();
        let store = SoundStore::in_dir(dir.path());
        store.save(&[entry("bell", "/s/bell.mp3")]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.file()).unwrap()).unwrap();
        assert_eq!(raw[0]["name"], "bell");
        assert_eq!(raw[0]["file"], "/s/bell.mp3");
    }

    #[test]
    fn localized_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SoundStore::in_dir(dir.path());
        fs::write(store.file(), r#"[{"이름": "bell", "파일": "/s/bell.mp3"}]"#).unwrap();

        assert!(matches!(store.load(), Err(PersistenceError::Malformed { .. })));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SoundStore::in_dir(dir.path());
        fs::write(
            store.file(),
            r#"[{"name": "bell", "file": "/s/bell.mp3", "volume": 3}]"#,
        )
        .unwrap();

        assert!(matches!(store.load(), Err(PersistenceError::Malformed { .. })));
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, b"x").unwrap();
        let store = SoundStore::in_dir(&blocker);

        assert!(matches!(
            store.save(&[entry("bell", "/s/bell.mp3")]),
            Err(PersistenceError::WriteFailed { .. })
        ));
    }
}
