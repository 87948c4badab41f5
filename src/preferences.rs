//! Client-local view preferences, injected into the row engine.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{CoreError, CoreResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub hide_completed: bool,
}

/// Loaded once when a view is built, saved on every change.
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Preferences;
    fn save(&self, preferences: &Preferences) -> CoreResult<()>;
}

/// Preferences kept in a JSON file.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Preferences {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                warn!("Failed to read preferences {}: {}", self.path.display(), e);
                return Preferences::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!("Ignoring unreadable preferences {}: {}", self.path.display(), e);
            Preferences::default()
        })
    }

    fn save(&self, preferences: &Preferences) -> CoreResult<()> {
        let json = serde_json::to_string_pretty(preferences)
            .map_err(|e| CoreError::internal(format!("Failed to encode preferences: {}", e)))?;
        std::fs::write(&self.path, json).map_err(|e| {
            CoreError::unavailable(format!(
                "Failed to write preferences {}: {}",
                self.path.display(),
                e
            ))
            .with_source(e)
        })
    }
}

/// In-process preferences, for tests and one-shot CLI runs.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    inner: Mutex<Preferences>,
}

impl MemoryPreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            inner: Mutex::new(preferences),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Preferences {
        self.inner
            .lock()
            .map(|guard| *guard)
            .unwrap_or_default()
    }

    fn save(&self, preferences: &Preferences) -> CoreResult<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| CoreError::internal("Preference lock poisoned"))?;
        *guard = *preferences;
        Ok(())
    }
}
