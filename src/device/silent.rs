/// Silent voices
///
/// Voices that produce no sound but keep full transport state. A silent voice
/// plays until it is stopped or [`SilentVoiceHandle::finish`] simulates the
/// natural end of its clip. Used for headless runs and for tests.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{AudioDevice, Voice};
use crate::clip::Clip;
use crate::error::AudioError;

#[derive(Debug, Clone, Default)]
struct SilentState {
    clip: Option<Arc<str>>,
    looping: bool,
    started: bool,
    paused: bool,
    volume: f32,
    muted: bool,
    plays: u64,
}

impl SilentState {
    fn is_playing(&self) -> bool {
        self.started && !self.paused
    }
}

/// Device creating [`SilentVoice`]s
///
/// Clones share the same voice registry.
#[derive(Clone, Default)]
pub struct SilentDevice {
    voices: Arc<Mutex<Vec<SilentVoiceHandle>>>,
    rejected: Arc<Mutex<Vec<String>>>,
}

impl SilentDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `set_clip` fail for clips with this name
    pub fn reject_clip(&self, name: impl Into<String>) {
        self.rejected.lock().push(name.into());
    }

    /// Handles to every voice created so far, in creation order
    pub fn voices(&self) -> Vec<SilentVoiceHandle> {
        self.voices.lock().clone()
    }

    pub fn voice_count(&self) -> usize {
        self.voices.lock().len()
    }

    /// Voices currently producing (silent) audio
    pub fn playing_voices(&self) -> Vec<SilentVoiceHandle> {
        self.voices
            .lock()
            .iter()
            .filter(|v| v.is_playing())
            .cloned()
            .collect()
    }

    /// End every non-looping clip, as if each reached its last sample
    pub fn finish_all(&self) {
        for voice in self.voices.lock().iter() {
            voice.finish();
        }
    }
}

impl AudioDevice for SilentDevice {
    type Voice = SilentVoice;

    fn create_voice(&self) -> Result<SilentVoice, AudioError> {
        let handle = SilentVoiceHandle {
            state: Arc::new(Mutex::new(SilentState {
                volume: 1.0,
                ..SilentState::default()
            })),
        };
        self.voices.lock().push(handle.clone());

        Ok(SilentVoice {
            handle,
            rejected: Arc::clone(&self.rejected),
        })
    }
}

/// Voice owned by a channel
pub struct SilentVoice {
    handle: SilentVoiceHandle,
    rejected: Arc<Mutex<Vec<String>>>,
}

impl SilentVoice {
    pub fn handle(&self) -> SilentVoiceHandle {
        self.handle.clone()
    }
}

impl Voice for SilentVoice {
    fn set_clip(&mut self, clip: &Clip) -> Result<(), AudioError> {
        if self.rejected.lock().iter().any(|name| name == clip.name()) {
            return Err(AudioError::DecodeFailed {
                clip: clip.name().to_string(),
                source: "clip rejected by silent device".into(),
            });
        }
        self.handle.state.lock().clip = Some(clip.shared_name());
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.handle.state.lock().looping = looping;
    }

    fn play(&mut self) {
        let mut state = self.handle.state.lock();
        if state.clip.is_none() {
            tracing::warn!("play() called on a voice with no clip bound");
            return;
        }
        state.started = true;
        state.paused = false;
        state.plays += 1;
    }

    fn pause(&mut self) {
        let mut state = self.handle.state.lock();
        if state.started {
            state.paused = true;
        }
    }

    fn unpause(&mut self) {
        self.handle.state.lock().paused = false;
    }

    fn stop(&mut self) {
        let mut state = self.handle.state.lock();
        state.started = false;
        state.paused = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.handle.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn set_mute(&mut self, mute: bool) {
        self.handle.state.lock().muted = mute;
    }

    fn is_playing(&self) -> bool {
        self.handle.is_playing()
    }
}

/// Observer and remote control for one silent voice
#[derive(Clone)]
pub struct SilentVoiceHandle {
    state: Arc<Mutex<SilentState>>,
}

impl SilentVoiceHandle {
    /// Simulate the clip reaching its end. Looping clips never end.
    pub fn finish(&self) {
        let mut state = self.state.lock();
        if !state.looping {
            state.started = false;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().is_playing()
    }

    /// True if the clip is still loaded but held by pause
    pub fn is_paused(&self) -> bool {
        let state = self.state.lock();
        state.started && state.paused
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    pub fn clip_name(&self) -> Option<String> {
        self.state.lock().clip.as_deref().map(str::to_string)
    }

    /// Number of times `play()` started this voice
    pub fn play_count(&self) -> u64 {
        self.state.lock().plays
    }
}
