/// rodio-backed voices
///
/// Each voice owns one `Sink` attached to a shared output mixer.

use std::io::Cursor;
use std::sync::Arc;

use ::rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::{AudioDevice, Voice};
use crate::clip::Clip;
use crate::error::AudioError;

/// Clip bytes readable without copying the preloaded buffer
#[derive(Clone)]
struct ClipBytes(Arc<[u8]>);

impl AsRef<[u8]> for ClipBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

type ClipDecoder = Decoder<Cursor<ClipBytes>>;

/// Device that hands out sinks on the default output
///
/// `OutputStream` must stay alive (and on the thread that opened it) for as
/// long as any voice plays, so it is returned separately from the device.
#[derive(Clone)]
pub struct RodioDevice {
    stream_handle: OutputStreamHandle,
}

impl RodioDevice {
    /// Open the default output device
    pub fn open_default() -> Result<(OutputStream, Self), AudioError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;
        tracing::info!("Opened default audio output");
        Ok((stream, Self { stream_handle }))
    }
}

impl AudioDevice for RodioDevice {
    type Voice = RodioVoice;

    fn create_voice(&self) -> Result<RodioVoice, AudioError> {
        RodioVoice::new(self.stream_handle.clone())
    }
}

/// Voice playing through a rodio `Sink`
pub struct RodioVoice {
    stream_handle: OutputStreamHandle,
    sink: Sink,
    clip: Option<(Arc<str>, ClipBytes)>,
    pending: Option<ClipDecoder>,
    looping: bool,
    volume: f32,
    muted: bool,
    sink_resets: u64,
}

impl RodioVoice {
    fn new(stream_handle: OutputStreamHandle) -> Result<Self, AudioError> {
        let sink = Sink::try_new(&stream_handle)
            .map_err(|e| AudioError::VoiceCreationFailed(Box::new(e)))?;
        sink.pause();

        Ok(Self {
            stream_handle,
            sink,
            clip: None,
            pending: None,
            looping: false,
            volume: 1.0,
            muted: false,
            sink_resets: 0,
        })
    }

    fn decode(name: &str, bytes: &ClipBytes) -> Result<ClipDecoder, AudioError> {
        Decoder::new(Cursor::new(bytes.clone())).map_err(|e| AudioError::DecodeFailed {
            clip: name.to_string(),
            source: Box::new(e),
        })
    }

    fn apply_volume(&self) {
        let effective = if self.muted { 0.0 } else { self.volume };
        self.sink.set_volume(effective);
    }

    /// Drop anything queued and start over with a fresh sink
    fn reset_sink(&mut self) {
        self.sink.stop();
        self.sink_resets += 1;
        match Sink::try_new(&self.stream_handle) {
            Ok(sink) => {
                sink.pause();
                self.sink = sink;
                self.apply_volume();
                tracing::trace!("Sink recreated ({} so far)", self.sink_resets);
            }
            Err(e) => tracing::warn!("Failed to recreate sink, reusing stopped one: {}", e),
        }
    }
}

impl Voice for RodioVoice {
    fn set_clip(&mut self, clip: &Clip) -> Result<(), AudioError> {
        let bytes = ClipBytes(clip.shared_bytes());
        let decoder = Self::decode(clip.name(), &bytes)?;
        self.pending = Some(decoder);
        self.clip = Some((clip.shared_name(), bytes));
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn play(&mut self) {
        let decoder = match self.pending.take() {
            Some(decoder) => decoder,
            None => {
                let Some((name, bytes)) = &self.clip else {
                    tracing::warn!("play() called on a voice with no clip bound");
                    return;
                };
                match Self::decode(name, bytes) {
                    Ok(decoder) => decoder,
                    Err(e) => {
                        tracing::warn!("Failed to restart clip: {}", e);
                        return;
                    }
                }
            }
        };

        if !self.sink.empty() {
            self.reset_sink();
        }

        let source: Box<dyn Source<Item = i16> + Send> = if self.looping {
            Box::new(decoder.repeat_infinite())
        } else {
            Box::new(decoder)
        };

        self.sink.append(source);
        self.apply_volume();
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn unpause(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.pending = None;
        if self.sink.empty() {
            return;
        }
        self.reset_sink();
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    fn set_mute(&mut self, mute: bool) {
        self.muted = mute;
        self.apply_volume();
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty() && !self.sink.is_paused()
    }
}
