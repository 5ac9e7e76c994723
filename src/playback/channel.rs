/// Playback channel
///
/// A channel binds one output voice to at most one play request at a time and
/// drives that request from start to detected completion.
///
/// ## Lifecycle
///
/// ```text
///           start()            pause()
///   Idle ────────────> Playing ───────> Paused
///    ▲                   │  ▲ unpause()   │
///    │                   │  └─────────────┘
///    │ reset()           │ poll_completion() == true
///    └──── Stopped <─────┘   (voice silent and no global pause)
/// ```

use std::fmt;
use std::sync::Arc;

use crate::clip::Clip;
use crate::device::Voice;
use crate::error::AudioError;

use super::completion::CompletionSignal;

/// Stable identifier assigned to a channel when the pool creates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Transport state of a channel's voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    /// In the pool, bound to nothing
    #[default]
    Idle,

    /// Started and tracked as active
    Playing,

    /// Held by pause, still tracked as active
    Paused,

    /// Play cycle completed, waiting to be released
    Stopped,
}

impl VoiceState {
    /// States in which the channel belongs to the active set
    pub fn is_active(&self) -> bool {
        matches!(self, VoiceState::Playing | VoiceState::Paused)
    }
}

/// Global transport values applied to a voice when it starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transport {
    pub volume: f32,
    pub mute: bool,
}

/// One reusable voice plus the state of its current play cycle
pub struct PlaybackChannel<V: Voice> {
    id: ChannelId,
    key: String,
    looping: bool,
    state: VoiceState,
    clip_name: Option<Arc<str>>,
    completion: Option<CompletionSignal>,
    voice: V,
}

impl<V: Voice> PlaybackChannel<V> {
    /// Bind a freshly created voice to a new channel
    pub(crate) fn configure(id: ChannelId, mut voice: V) -> Self {
        voice.set_looping(false);
        Self {
            id,
            key: String::new(),
            looping: false,
            state: VoiceState::Idle,
            clip_name: None,
            completion: None,
            voice,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    /// Key the channel can be stopped by. Empty for anonymous sounds.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn clip_name(&self) -> Option<&str> {
        self.clip_name.as_deref()
    }

    pub(crate) fn shared_clip_name(&self) -> Option<Arc<str>> {
        self.clip_name.clone()
    }

    pub fn voice(&self) -> &V {
        &self.voice
    }

    /// True if stopping by `key` should reach this channel.
    /// Empty keys never match, so anonymous sounds stay unaddressable.
    pub(crate) fn matches_key(&self, key: &str) -> bool {
        !key.is_empty() && self.key == key
    }

    /// Begin a play cycle.
    ///
    /// On error the channel is left idle and must go back to the pool.
    pub(crate) fn start(&mut self, clip: &Clip, transport: Transport) -> Result<(), AudioError> {
        debug_assert_eq!(self.state, VoiceState::Idle, "channel started while in use");

        self.voice.set_looping(self.looping);
        if let Err(e) = self.voice.set_clip(clip) {
            self.key.clear();
            self.looping = false;
            self.voice.set_looping(false);
            return Err(e);
        }

        self.voice.set_volume(transport.volume);
        self.voice.set_mute(transport.mute);
        self.voice.play();

        self.clip_name = Some(clip.shared_name());
        self.state = VoiceState::Playing;

        tracing::debug!(
            "{} playing '{}' (key: {:?}, loop: {})",
            self.id,
            clip.name(),
            self.key,
            self.looping
        );
        Ok(())
    }

    /// Begin a keyed play cycle
    pub(crate) fn start_keyed(
        &mut self,
        clip: &Clip,
        key: &str,
        looping: bool,
        transport: Transport,
    ) -> Result<(), AudioError> {
        self.key.clear();
        self.key.push_str(key);
        self.looping = looping;
        self.start(clip, transport)
    }

    /// Attach the signal fired when this cycle is released
    pub(crate) fn attach_completion(&mut self, signal: CompletionSignal) {
        self.completion = Some(signal);
    }

    /// Re-check whether the play cycle is over.
    ///
    /// Over means the voice is silent and the manager is not globally paused.
    /// A sound that ends during a global pause stays active until unpause.
    pub(crate) fn poll_completion(&mut self, global_pause: bool) -> bool {
        if !self.state.is_active() {
            return self.state == VoiceState::Stopped;
        }
        if self.voice.is_playing() || global_pause {
            return false;
        }
        self.state = VoiceState::Stopped;
        true
    }

    /// Clear per-request state once deregistered. The returned signal must
    /// be dropped only after the channel is back in the pool.
    pub(crate) fn finish(&mut self) -> Option<CompletionSignal> {
        self.key.clear();
        self.completion.take()
    }

    /// Release hook: leave the channel inert and ready for reuse
    pub(crate) fn reset(&mut self) {
        self.voice.stop();
        self.voice.set_looping(false);
        self.key.clear();
        self.looping = false;
        self.clip_name = None;
        self.state = VoiceState::Idle;
    }

    pub fn stop(&mut self) {
        self.voice.stop();
    }

    pub fn pause(&mut self) {
        self.voice.pause();
        if self.state == VoiceState::Playing {
            self.state = VoiceState::Paused;
        }
    }

    pub fn unpause(&mut self) {
        self.voice.unpause();
        if self.state == VoiceState::Paused {
            self.state = VoiceState::Playing;
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.voice.set_volume(volume);
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.voice.set_mute(mute);
    }
}

impl<V: Voice> fmt::Debug for PlaybackChannel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackChannel")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("looping", &self.looping)
            .field("state", &self.state)
            .field("clip", &self.clip_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{AudioDevice, SilentDevice, SilentVoice};
    use crate::playback::completion::completion_pair;

    const TRANSPORT: Transport = Transport {
        volume: 0.5,
        mute: false,
    };

    fn channel(device: &SilentDevice) -> PlaybackChannel<SilentVoice> {
        PlaybackChannel::configure(ChannelId(0), device.create_voice().unwrap())
    }

    fn clip(name: &str) -> Clip {
        Clip::from_bytes(name, vec![0u8; 8])
    }

    #[test]
    fn test_configure_resets_state() {
        let device = SilentDevice::new();
        let channel = channel(&device);

        assert_eq!(channel.key(), "");
        assert!(!channel.is_looping());
        assert_eq!(channel.state(), VoiceState::Idle);
        assert!(!device.voices()[0].is_looping());
    }

    #[test]
    fn test_start_applies_transport() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);

        let transport = Transport {
            volume: 0.25,
            mute: true,
        };
        channel.start(&clip("click"), transport).unwrap();

        let voice = channel.voice().handle();
        assert!(voice.is_playing());
        assert_eq!(voice.volume(), 0.25);
        assert!(voice.is_muted());
        assert_eq!(channel.state(), VoiceState::Playing);
        assert_eq!(channel.clip_name(), Some("click"));
    }

    #[test]
    fn test_completion_requires_silence() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        channel.start(&clip("click"), TRANSPORT).unwrap();

        assert!(!channel.poll_completion(false));
        channel.voice().handle().finish();
        assert!(channel.poll_completion(false));
        assert_eq!(channel.state(), VoiceState::Stopped);
    }

    #[test]
    fn test_completion_gated_by_global_pause() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        channel.start(&clip("click"), TRANSPORT).unwrap();
        channel.voice().handle().finish();

        assert!(!channel.poll_completion(true));
        assert!(!channel.poll_completion(true));
        assert_eq!(channel.state(), VoiceState::Playing);
        assert!(channel.poll_completion(false));
    }

    #[test]
    fn test_looping_only_completes_after_stop() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        channel
            .start_keyed(&clip("engine"), "engine", true, TRANSPORT)
            .unwrap();

        channel.voice().handle().finish();
        for _ in 0..10 {
            assert!(!channel.poll_completion(false));
        }

        channel.stop();
        assert!(channel.poll_completion(false));
    }

    #[test]
    fn test_pause_and_unpause_track_state() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        channel.start(&clip("click"), TRANSPORT).unwrap();

        channel.pause();
        assert_eq!(channel.state(), VoiceState::Paused);
        assert!(channel.state().is_active());

        channel.unpause();
        assert_eq!(channel.state(), VoiceState::Playing);
    }

    #[test]
    fn test_failed_start_leaves_channel_idle() {
        let device = SilentDevice::new();
        device.reject_clip("broken");
        let mut channel = channel(&device);

        let result = channel.start_keyed(&clip("broken"), "music", true, TRANSPORT);
        assert!(result.is_err());
        assert_eq!(channel.state(), VoiceState::Idle);
        assert_eq!(channel.key(), "");
        assert!(!channel.is_looping());
    }

    #[test]
    fn test_finish_and_reset() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        let (signal, completion) = completion_pair(channel.id());

        channel
            .start_keyed(&clip("alarm"), "alarm", true, TRANSPORT)
            .unwrap();
        channel.attach_completion(signal);
        channel.stop();
        assert!(channel.poll_completion(false));

        let signal = channel.finish();
        assert_eq!(channel.key(), "");
        assert!(signal.is_some());
        assert!(!completion.is_done());

        channel.reset();
        drop(signal);
        assert!(completion.is_done());
        assert_eq!(channel.state(), VoiceState::Idle);
        assert!(!channel.voice().is_playing());
        assert!(!channel.voice().handle().is_looping());
    }

    #[test]
    fn test_empty_key_never_matches() {
        let device = SilentDevice::new();
        let mut channel = channel(&device);
        channel.start(&clip("click"), TRANSPORT).unwrap();

        assert!(!channel.matches_key(""));
        channel.reset();
        channel
            .start_keyed(&clip("click"), "ui", false, TRANSPORT)
            .unwrap();
        assert!(channel.matches_key("ui"));
        assert!(!channel.matches_key("UI"));
    }
}
