/// Pooled playback engine
///
/// Multiplexes any number of play requests onto a small set of reusable
/// channels and keeps group transport controls consistent while channels
/// start, finish and get recycled.
///
/// ## Architecture
///
/// ```text
/// PlaybackManager
///   ├── transport: volume, mute, global pause
///   ├── active set ──┐
///   │   ├── PlaybackChannel (key "engine", looping)
///   │   └── PlaybackChannel (anonymous)
///   │                │ tick(): silent and not paused?
///   │                ▼
///   └── ChannelPool (idle channels, each owning one Voice)
/// ```
///
/// A channel is moved out of the pool when a play request starts and moved
/// back once `tick()` finds its voice silent while the manager is not
/// globally paused. It is never in both places.
///
/// ## Usage
///
/// ```rust,ignore
/// let (_stream, device) = RodioDevice::open_default()?;
/// let manager = Arc::new(PlaybackManager::new(device, JsonSettingsStore::open_default()?));
/// let _ticker = Ticker::spawn(Arc::clone(&manager), Duration::from_millis(16))?;
///
/// manager.play(&click)?;
/// manager.play_looped(&engine, "engine")?;
/// manager.play_await(&door)?.wait();
/// manager.stop("engine");
/// ```

pub mod channel;
pub mod completion;
pub mod manager;
pub mod pool;
pub mod ticker;

// Re-export commonly used types
pub use channel::{ChannelId, PlaybackChannel, Transport, VoiceState};
pub use completion::Completion;
pub use manager::{ChannelInfo, PlaybackManager};
pub use pool::{ChannelPool, PoolStats, DEFAULT_MAX_IDLE, DEFAULT_POOL_CAPACITY};
pub use ticker::Ticker;
