/// Playback events
///
/// Events describe things that already happened (past tense).
/// They are broadcast to all subscribers.
use std::sync::Arc;

use crate::playback::ChannelId;

/// Lifecycle notifications published by the playback manager
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A channel started playing a clip
    Started {
        channel: ChannelId,
        key: String,
        clip: Arc<str>,
    },

    /// A channel completed its play cycle and went back to the pool
    Finished {
        channel: ChannelId,
        key: String,
        clip: Option<Arc<str>>,
    },

    /// Channels under a key were asked to stop
    StoppedByKey { key: String, count: usize },

    /// Every active channel was asked to stop
    StoppedAll { count: usize },

    /// Global pause was set
    PausedAll,

    /// Global pause was cleared
    ResumedAll,

    /// Global volume changed
    VolumeChanged(f32),

    /// Global mute changed
    MuteChanged(bool),

    /// The manager is shutting down
    Shutdown,
}

impl PlaybackEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            PlaybackEvent::Started { channel, key, clip } => {
                if key.is_empty() {
                    format!("{} started '{}'", channel, clip)
                } else {
                    format!("{} started '{}' as {}", channel, clip, key)
                }
            }
            PlaybackEvent::Finished { channel, clip, .. } => match clip {
                Some(clip) => format!("{} finished '{}'", channel, clip),
                None => format!("{} finished", channel),
            },
            PlaybackEvent::StoppedByKey { key, count } => {
                format!("Stopped {} channel(s) for {}", count, key)
            }
            PlaybackEvent::StoppedAll { count } => format!("Stopped {} channel(s)", count),
            PlaybackEvent::PausedAll => "Paused all".to_string(),
            PlaybackEvent::ResumedAll => "Resumed all".to_string(),
            PlaybackEvent::VolumeChanged(volume) => format!("Volume set to {:.2}", volume),
            PlaybackEvent::MuteChanged(mute) => {
                if *mute {
                    "Muted".to_string()
                } else {
                    "Unmuted".to_string()
                }
            }
            PlaybackEvent::Shutdown => "Shutting down".to_string(),
        }
    }
}
