//! Persistence collaborator
//!
//! The engine never writes files itself; it hands the whole settings blob
//! to a `SettingsStore` after every state-changing call.

use crate::core::error::{EngineError, Result};
use crate::host::settings::Settings;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub trait SettingsStore {
    fn load(&self) -> Result<Settings>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Pretty-printed JSON file; a missing file loads as fresh settings
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No settings file, starting fresh");
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// In-memory store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    settings: Option<Settings>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing settings
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                settings: Some(settings),
                saves: 0,
            }),
        }
    }

    /// Number of completed `save` calls
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.saves).unwrap_or(0)
    }

    /// Last saved settings
    pub fn snapshot(&self) -> Option<Settings> {
        self.inner.lock().ok().and_then(|inner| inner.settings.clone())
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Settings> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| EngineError::InvalidOperation("settings store lock poisoned".into()))?;
        Ok(inner.settings.clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| EngineError::InvalidOperation("settings store lock poisoned".into()))?;
        inner.settings = Some(settings.clone());
        inner.saves += 1;
        Ok(())
    }
}
