/// Audio device abstraction
///
/// The playback engine never touches audio hardware directly. It asks an
/// [`AudioDevice`] for voices and drives each [`Voice`] through a small
/// transport surface.
///
/// ## Implementations
///
/// ```text
/// AudioDevice
///   ├── RodioDevice   real output through a rodio mixer
///   └── SilentDevice  no output, voice state only (headless runs, tests)
/// ```

pub mod rodio;
pub mod silent;

pub use self::rodio::{RodioDevice, RodioVoice};
pub use self::silent::{SilentDevice, SilentVoice, SilentVoiceHandle};

use crate::clip::Clip;
use crate::error::AudioError;

/// One hardware playback unit, able to play a single clip at a time
pub trait Voice: Send + 'static {
    /// Bind a clip, replacing whatever was bound before.
    /// Fails if the device cannot decode the clip.
    fn set_clip(&mut self, clip: &Clip) -> Result<(), AudioError>;

    fn set_looping(&mut self, looping: bool);

    /// Start the bound clip from the beginning
    fn play(&mut self);

    fn pause(&mut self);

    fn unpause(&mut self);

    fn stop(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn set_mute(&mut self, mute: bool);

    /// True while the voice is producing audio.
    /// A paused voice is not playing.
    fn is_playing(&self) -> bool;
}

/// Factory for voices
pub trait AudioDevice: Send + Sync + 'static {
    type Voice: Voice;

    fn create_voice(&self) -> Result<Self::Voice, AudioError>;
}
