/// Messaging module
///
/// Broadcasts playback lifecycle events to any number of observers.
///
/// ```text
/// ┌──────────────────┐   PlaybackEvent   ┌───────────┐
/// │ PlaybackManager  │ ────────────────> │ Event Bus │ ──> subscribers
/// └──────────────────┘                   └───────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let (rx, _id) = manager.subscribe();
///
/// while let Ok(event) = rx.try_recv() {
///     match event {
///         PlaybackEvent::Finished { key, .. } => { /* update UI */ }
///         _ => {}
///     }
/// }
/// ```

pub mod bus;
pub mod events;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use events::PlaybackEvent;
