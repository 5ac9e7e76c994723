//! sfx-pool
//!
//! Pooled sound-effect playback for games and interactive applications:
//! fire-and-forget and awaitable playback, keyed stop, global pause,
//! volume and mute, with settings persisted between sessions.

pub mod clip;
pub mod config;
pub mod device;
pub mod error;
pub mod messaging;
pub mod playback;
pub mod settings;

// Re-export commonly used types
pub use clip::Clip;
pub use config::SfxConfig;
pub use device::{AudioDevice, RodioDevice, SilentDevice, Voice};
pub use error::{AppResult, AudioError, ConfigError, SettingsError};
pub use messaging::{EventBus, PlaybackEvent, SubscriberId};
pub use playback::{
    ChannelId, ChannelInfo, Completion, PlaybackManager, PoolStats, Ticker, VoiceState,
};
pub use settings::{AudioSettings, JsonSettingsStore, MemorySettingsStore, SettingsStore};
