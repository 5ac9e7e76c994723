/// Playback event fan-out
///
/// Every subscriber gets its own unbounded queue. Publishing never blocks the
/// caller, which matters because the manager publishes while holding its lock.
/// Subscribers whose receiver was dropped are pruned on the next publish.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;

use super::events::PlaybackEvent;

/// Handle for cancelling a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<PlaybackEvent>,
}

/// Broadcasts [`PlaybackEvent`]s. Clones share subscribers.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new subscription
    pub fn subscribe(&self) -> (Receiver<PlaybackEvent>, SubscriberId) {
        let (sender, receiver) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender });
        (receiver, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Send `event` to every live subscriber
    pub fn publish(&self, event: PlaybackEvent) {
        let mut closed = Vec::new();

        for subscriber in self.subscribers.read().iter() {
            if let Err(TrySendError::Disconnected(_)) = subscriber.sender.try_send(event.clone()) {
                closed.push(subscriber.id);
            }
        }

        if !closed.is_empty() {
            tracing::trace!("Dropping {} closed subscriber(s)", closed.len());
            self.subscribers.write().retain(|s| !closed.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}
