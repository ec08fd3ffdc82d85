use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::types::{AppState, PrefsUpdate};
use crate::error::{ClearSkinError, Result};

/// Onboarding answers and navigation gates, kept in one JSON file.
///
/// Every mutation is a read-modify-write of the whole file, serialized by an
/// internal lock and finished with an atomic rename.
pub struct PreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current state. A missing or unreadable file reads as defaults.
    pub fn app_state(&self) -> AppState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return AppState::default(),
            Err(e) => {
                warn!("Failed to read preferences {:?}: {}", self.path, e);
                return AppState::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Preferences file {:?} is corrupt ({}), using defaults", self.path, e);
            AppState::default()
        })
    }

    pub fn set_prefs(&self, update: PrefsUpdate) -> Result<AppState> {
        self.update(|state| state.user_prefs.merge(update))
    }

    pub fn set_seen_onboarding(&self, seen: bool) -> Result<AppState> {
        self.update(|state| state.has_seen_onboarding = seen)
    }

    pub fn set_purchased(&self, purchased: bool) -> Result<AppState> {
        self.update(|state| state.has_purchased = purchased)
    }

    /// Delete the file, returning every key to its default.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Cleared preferences at {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut AppState)) -> Result<AppState> {
        let _guard = self.lock()?;
        let mut state = self.app_state();
        apply(&mut state);
        self.write_atomic(&state)?;
        Ok(state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| ClearSkinError::Storage("Preference store lock poisoned".to_string()))
    }

    fn write_atomic(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| ClearSkinError::Storage(format!("Failed to serialize preferences: {}", e)))?;

        let parent = self.path.parent().ok_or_else(|| {
            ClearSkinError::Config(format!("Preferences path has no parent directory: {:?}", self.path))
        })?;
        std::fs::create_dir_all(parent)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        info!("Wrote preferences to {:?}", self.path);
        Ok(())
    }
}
