/// Audio clips
///
/// A clip is an immutable, cheaply clonable handle to encoded audio bytes.
/// Devices decode the bytes when a clip is bound to a voice.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::AudioError;

/// Handle to a preloaded sound
#[derive(Clone)]
pub struct Clip {
    name: Arc<str>,
    bytes: Arc<[u8]>,
}

impl Clip {
    /// Create a clip from bytes already in memory
    pub fn from_bytes(name: impl Into<Arc<str>>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Preload an audio file into memory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AudioError::LoadFailed {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!("Preloaded clip: {} ({} bytes)", path.display(), bytes.len());

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::from_bytes(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True if both handles point at the same preloaded buffer
    pub fn same_buffer(&self, other: &Clip) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}
