//! In-memory sound catalog with write-through persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::store::SoundStore;
use crate::error::{PersistenceError, RegistryError};

/// File extensions accepted by [`SoundRegistry::import`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// A named, playable sound file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundEntry {
    pub name: String,
    pub file: PathBuf,
}

/// Catalog of alarm sounds, kept in insertion order.
///
/// Every mutating call persists the whole catalog before returning. If the
/// write fails the in-memory change is rolled back.
#[derive(Debug)]
pub struct SoundRegistry {
    entries: Vec<SoundEntry>,
    store: Option<SoundStore>,
}

impl SoundRegistry {
    /// Registry that is never written anywhere.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            store: None,
        }
    }

    /// Open the registry backed by `store`.
    ///
    /// An unreadable or malformed file degrades to an empty registry; the
    /// next successful mutation replaces it.
    pub fn open(store: SoundStore) -> Self {
        let entries = match store.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "sound list unreadable, starting empty");
                Vec::new()
            }
        };
        debug!(count = entries.len(), path = %store.file().display(), "sound registry loaded");
        Self {
            entries,
            store: Some(store),
        }
    }

    /// Open the registry, failing instead of degrading when the file is bad.
    pub fn open_strict(store: SoundStore) -> Result<Self, PersistenceError> {
        let entries = store.load()?;
        Ok(Self {
            entries,
            store: Some(store),
        })
    }

    pub fn list(&self) -> &[SoundEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// File for `name`, if registered.
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.position(name).map(|i| self.entries[i].file.as_path())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn add(&mut self, name: &str, file: impl Into<PathBuf>) -> Result<(), RegistryError> {
        let name = normalize_name(name)?;
        if self.contains(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let entry = SoundEntry {
            name,
            file: file.into(),
        };
        info!(name = %entry.name, file = %entry.file.display(), "sound added");
        self.mutate(|entries| entries.push(entry))
    }

    /// Rename and/or repoint `old_name`, keeping its position.
    pub fn edit(
        &mut self,
        old_name: &str,
        new_name: &str,
        new_file: impl Into<PathBuf>,
    ) -> Result<(), RegistryError> {
        let index = self
            .position(old_name)
            .ok_or_else(|| RegistryError::NotFound(old_name.to_string()))?;
        let new_name = normalize_name(new_name)?;
        if new_name != self.entries[index].name && self.contains(&new_name) {
            return Err(RegistryError::DuplicateName(new_name));
        }
        let entry = SoundEntry {
            name: new_name,
            file: new_file.into(),
        };
        info!(from = old_name, to = %entry.name, "sound edited");
        self.mutate(|entries| entries[index] = entry)
    }

    pub fn remove(&mut self, name: &str) -> Result<SoundEntry, RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        let removed = self.entries[index].clone();
        self.mutate(|entries| {
            entries.remove(index);
        })?;
        info!(name, "sound removed");
        Ok(removed)
    }

    /// Copy `source` into the managed folder and register the copy.
    ///
    /// A file already present under the same basename is reused, not
    /// overwritten.
    pub fn import(&mut self, name: &str, source: &Path) -> Result<(), RegistryError> {
        let name = normalize_name(name)?;
        if self.contains(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let (managed, copied) = self.copy_into_store(source)?;
        let result = self.add(&name, managed.clone());
        discard_on_error(result, &managed, copied)
    }

    /// Like [`edit`](Self::edit), importing `source` as the new file.
    pub fn edit_import(
        &mut self,
        old_name: &str,
        new_name: &str,
        source: &Path,
    ) -> Result<(), RegistryError> {
        let index = self
            .position(old_name)
            .ok_or_else(|| RegistryError::NotFound(old_name.to_string()))?;
        let checked = normalize_name(new_name)?;
        if checked != self.entries[index].name && self.contains(&checked) {
            return Err(RegistryError::DuplicateName(checked));
        }
        let (managed, copied) = self.copy_into_store(source)?;
        let result = self.edit(old_name, new_name, managed.clone());
        discard_on_error(result, &managed, copied)
    }

    /// Returns the managed path and whether this call created the file.
    fn copy_into_store(&self, source: &Path) -> Result<(PathBuf, bool), RegistryError> {
        let supported = source
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            return Err(RegistryError::UnsupportedFormat(source.to_path_buf()));
        }
        if !source.is_file() {
            return Err(RegistryError::SourceMissing(source.to_path_buf()));
        }

        // Without a store there is no managed folder; reference the file in place.
        let Some(store) = &self.store else {
            return Ok((source.to_path_buf(), false));
        };
        let Some(file_name) = source.file_name() else {
            return Err(RegistryError::SourceMissing(source.to_path_buf()));
        };
        let destination = store.sounds_dir().join(file_name);
        let import_failed = |source_err| RegistryError::ImportFailed {
            from: source.to_path_buf(),
            to: destination.clone(),
            source: source_err,
        };

        store.ensure_sounds_dir().map_err(import_failed)?;
        if destination.exists() {
            debug!(path = %destination.display(), "sound file already imported");
            return Ok((destination, false));
        }
        std::fs::copy(source, &destination).map_err(import_failed)?;
        debug!(from = %source.display(), to = %destination.display(), "sound file copied");
        Ok((destination, true))
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.entries.iter().position(|e| e.name == name)
    }

    /// Apply `change`, persist, and roll back if persisting fails.
    fn mutate(&mut self, change: impl FnOnce(&mut Vec<SoundEntry>)) -> Result<(), RegistryError> {
        let previous = self.entries.clone();
        change(&mut self.entries);
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.entries) {
                self.entries = previous;
                return Err(e.into());
            }
        }
        Ok(())
    }
}

/// Remove a file copied for an import that then failed to register.
fn discard_on_error(
    result: Result<(), RegistryError>,
    managed: &Path,
    copied: bool,
) -> Result<(), RegistryError> {
    if result.is_err() && copied {
        if let Err(e) = std::fs::remove_file(managed) {
            warn!(path = %managed.display(), error = %e, "could not remove orphaned sound copy");
        }
    }
    result
}

fn normalize_name(name: &str) -> Result<String, RegistryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistryError::EmptyName);
    }
    Ok(name.to_string())
}
