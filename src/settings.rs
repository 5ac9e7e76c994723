/// Persisted audio settings
///
/// Volume and mute survive restarts through a small key-value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Store key for the global volume (float)
pub const VOLUME_KEY: &str = "audio-volume";

/// Store key for the global mute flag (int, 0 or 1)
pub const MUTE_KEY: &str = "audio-mute";

/// Volume used when nothing was saved yet
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Key-value settings storage
pub trait SettingsStore: Send {
    fn get_float(&self, key: &str, default: f32) -> f32;

    fn set_float(&mut self, key: &str, value: f32);

    fn get_int(&self, key: &str, default: i32) -> i32;

    fn set_int(&mut self, key: &str, value: i32);

    /// Make previous writes durable
    fn flush(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Typed values as written to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsData {
    #[serde(default)]
    floats: BTreeMap<String, f32>,
    #[serde(default)]
    ints: BTreeMap<String, i32>,
}

/// Persisted settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    /// Version of the file layout (for future migrations)
    version: u32,

    #[serde(flatten)]
    data: SettingsData,
}

impl SettingsFile {
    const VERSION: u32 = 1;
}

/// Settings kept in a JSON file
pub struct JsonSettingsStore {
    path: PathBuf,
    data: SettingsData,
    dirty: bool,
}

impl JsonSettingsStore {
    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("SfxPool").join("settings.json"))
    }

    /// Open the settings file in the platform config directory
    pub fn open_default() -> Result<Self, SettingsError> {
        let path = Self::default_path().ok_or(SettingsError::NoSettingsDir)?;
        Self::open(path)
    }

    /// Open a settings file. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();

        if !path.exists() {
            tracing::debug!("No settings found at {}, starting fresh", path.display());
            return Ok(Self {
                path,
                data: SettingsData::default(),
                dirty: false,
            });
        }

        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            SettingsError::LoadFailed {
                path: path.display().to_string(),
                source,
            }
        };

        let json = std::fs::read_to_string(&path).map_err(|e| load_failed(Box::new(e)))?;
        let file: SettingsFile =
            serde_json::from_str(&json).map_err(|e| load_failed(Box::new(e)))?;

        if file.version != SettingsFile::VERSION {
            tracing::warn!(
                "Settings version mismatch: expected {}, found {}",
                SettingsFile::VERSION,
                file.version
            );
        }

        tracing::debug!("Loaded settings from: {}", path.display());
        Ok(Self {
            path,
            data: file.data,
            dirty: false,
        })
    }

    /// Open a settings file, starting empty if it cannot be read.
    ///
    /// The store stays bound to `path`, so the next flush replaces the
    /// unreadable file.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!("{}, using default settings", e);
                Self {
                    path,
                    data: SettingsData::default(),
                    dirty: false,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.data.floats.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.data.floats.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.data.ints.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.data.ints.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<(), SettingsError> {
        if !self.dirty {
            return Ok(());
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| {
            SettingsError::SaveFailed {
                path: self.path.display().to_string(),
                source,
            }
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(Box::new(e)))?;
        }

        let file = SettingsFile {
            version: SettingsFile::VERSION,
            data: self.data.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| save_failed(Box::new(e)))?;
        std::fs::write(&self.path, json).map_err(|e| save_failed(Box::new(e)))?;

        self.dirty = false;
        tracing::debug!("Saved settings to: {}", self.path.display());
        Ok(())
    }
}

/// In-memory settings. Clones share the same values.
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    data: Arc<Mutex<SettingsData>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.data.lock().floats.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.data.lock().floats.insert(key.to_string(), value);
    }

    fn get_int(&self, key: &str, default: i32) -> i32 {
        self.data.lock().ints.get(key).copied().unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.data.lock().ints.insert(key.to_string(), value);
    }
}

/// Volume and mute as persisted between sessions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSettings {
    pub volume: f32,
    pub mute: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            mute: false,
        }
    }
}

impl AudioSettings {
    /// Read from a store, falling back to defaults for missing or bad values
    pub fn load(store: &dyn SettingsStore) -> Self {
        let volume = store.get_float(VOLUME_KEY, DEFAULT_VOLUME);
        let volume = if volume.is_nan() {
            tracing::warn!("Stored volume is NaN, using {}", DEFAULT_VOLUME);
            DEFAULT_VOLUME
        } else {
            volume.clamp(0.0, 1.0)
        };

        Self {
            volume,
            mute: store.get_int(MUTE_KEY, 0) == 1,
        }
    }

    /// Write to a store (without flushing)
    pub fn store(&self, store: &mut dyn SettingsStore) {
        store.set_float(VOLUME_KEY, self.volume);
        store.set_int(MUTE_KEY, if self.mute { 1 } else { 0 });
    }
}
