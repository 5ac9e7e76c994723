/// Channel pool
///
/// Free list of idle channels. Channels are created on demand, reset when
/// released, and destroyed when the free list is already at its cap.

use crate::device::AudioDevice;
use crate::error::AudioError;

use super::channel::{ChannelId, PlaybackChannel};

/// Default number of channels the free list reserves room for
pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Default number of idle channels kept alive
pub const DEFAULT_MAX_IDLE: usize = 10;

/// Pool counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Channels created over the pool's lifetime
    pub created: u64,

    /// Channels destroyed by trimming or teardown
    pub destroyed: u64,

    /// Channels waiting in the free list
    pub idle: usize,

    /// Channels out of the pool (filled in by the manager)
    pub active: usize,
}

impl PoolStats {
    /// Channels currently alive
    pub fn alive(&self) -> u64 {
        self.created - self.destroyed
    }
}

pub struct ChannelPool<D: AudioDevice> {
    device: D,
    idle: Vec<PlaybackChannel<D::Voice>>,
    max_idle: usize,
    next_id: u64,
    created: u64,
    destroyed: u64,
}

impl<D: AudioDevice> ChannelPool<D> {
    pub fn new(device: D, capacity: usize, max_idle: usize) -> Self {
        Self {
            device,
            idle: Vec::with_capacity(capacity),
            max_idle: max_idle.max(1),
            next_id: 0,
            created: 0,
            destroyed: 0,
        }
    }

    /// Take an idle channel, creating one if the free list is empty
    pub fn acquire(&mut self) -> Result<PlaybackChannel<D::Voice>, AudioError> {
        if let Some(channel) = self.idle.pop() {
            return Ok(channel);
        }

        let voice = self.device.create_voice()?;
        let id = ChannelId(self.next_id);
        self.next_id += 1;
        self.created += 1;

        tracing::debug!("Created {} ({} alive)", id, self.created - self.destroyed);
        Ok(PlaybackChannel::configure(id, voice))
    }

    /// Reset a channel and return it to the free list
    pub fn release(&mut self, mut channel: PlaybackChannel<D::Voice>) {
        channel.reset();

        if self.idle.len() >= self.max_idle {
            tracing::debug!("Pool full, destroying {}", channel.id());
            self.destroy(channel);
            return;
        }

        self.idle.push(channel);
    }

    /// Tear down a channel and its voice
    pub fn destroy(&mut self, mut channel: PlaybackChannel<D::Voice>) {
        channel.reset();
        self.destroyed += 1;
        drop(channel);
    }

    /// Destroy every idle channel
    pub fn clear(&mut self) {
        let count = self.idle.len();
        for channel in std::mem::take(&mut self.idle) {
            self.destroy(channel);
        }
        if count > 0 {
            tracing::debug!("Destroyed {} idle channels", count);
        }
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn max_idle(&self) -> usize {
        self.max_idle
    }

    /// Idle channels, most recently released last
    pub fn idle_channels(&self) -> &[PlaybackChannel<D::Voice>] {
        &self.idle
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created,
            destroyed: self.destroyed,
            idle: self.idle.len(),
            active: 0,
        }
    }
}
