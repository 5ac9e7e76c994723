/// Playback manager
///
/// Multiplexes play requests onto pooled channels and applies transport
/// operations to every active channel.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use super::channel::{ChannelId, PlaybackChannel, Transport, VoiceState};
use super::completion::{completion_pair, Completion, CompletionSignal};
use super::pool::{ChannelPool, PoolStats, DEFAULT_MAX_IDLE, DEFAULT_POOL_CAPACITY};
use crate::clip::Clip;
use crate::config::SfxConfig;
use crate::device::AudioDevice;
use crate::error::{AudioError, SettingsError};
use crate::messaging::{EventBus, PlaybackEvent, SubscriberId};
use crate::settings::{AudioSettings, SettingsStore};

/// Read-only view of an active channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub key: String,
    pub state: VoiceState,
    pub looping: bool,
    pub clip: Option<Arc<str>>,
}

impl<V: crate::device::Voice> From<&PlaybackChannel<V>> for ChannelInfo {
    fn from(channel: &PlaybackChannel<V>) -> Self {
        Self {
            id: channel.id(),
            key: channel.key().to_string(),
            state: channel.state(),
            looping: channel.is_looping(),
            clip: channel.shared_clip_name(),
        }
    }
}

/// How a play request binds its channel
enum Request<'a> {
    Anonymous,
    Keyed { key: &'a str, looping: bool },
}

struct Inner<D: AudioDevice> {
    volume: f32,
    mute: bool,
    paused: bool,
    shut_down: bool,
    pool: ChannelPool<D>,
    active: Vec<PlaybackChannel<D::Voice>>,
}

impl<D: AudioDevice> Inner<D> {
    /// Start `clip` on a pooled channel and register it as active
    fn begin(
        &mut self,
        clip: &Clip,
        request: Request<'_>,
        events: &EventBus,
    ) -> Result<&mut PlaybackChannel<D::Voice>, AudioError> {
        if self.shut_down {
            return Err(AudioError::ShutDown);
        }

        let mut channel = self.pool.acquire()?;
        let transport = Transport {
            volume: self.volume,
            mute: self.mute,
        };

        let started = match request {
            Request::Anonymous => channel.start(clip, transport),
            Request::Keyed { key, looping } => channel.start_keyed(clip, key, looping, transport),
        };
        if let Err(e) = started {
            tracing::warn!("Failed to play '{}': {}", clip.name(), e);
            self.pool.release(channel);
            return Err(e);
        }

        events.publish(PlaybackEvent::Started {
            channel: channel.id(),
            key: channel.key().to_string(),
            clip: clip.shared_name(),
        });

        // Registered before any tick can check it for completion
        let index = self.active.len();
        self.active.push(channel);
        Ok(&mut self.active[index])
    }

    fn stop_key(&mut self, key: &str) -> usize {
        let mut count = 0;
        for channel in self.active.iter_mut().filter(|c| c.matches_key(key)) {
            channel.stop();
            count += 1;
        }
        count
    }

    /// Remove completed channels from the active set and release them.
    /// Returns the completion signals, to be fired once the lock is dropped.
    fn reclaim(&mut self, events: &EventBus) -> Vec<CompletionSignal> {
        let mut signals = Vec::new();
        let mut i = 0;

        while i < self.active.len() {
            if !self.active[i].poll_completion(self.paused) {
                i += 1;
                continue;
            }

            let mut channel = self.active.swap_remove(i);
            let id = channel.id();
            let key = channel.key().to_string();
            let clip = channel.shared_clip_name();

            if let Some(signal) = channel.finish() {
                signals.push(signal);
            }
            self.pool.release(channel);

            tracing::debug!("{} finished, returned to pool", id);
            events.publish(PlaybackEvent::Finished {
                channel: id,
                key,
                clip,
            });
        }

        signals
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active.len(),
            ..self.pool.stats()
        }
    }
}

/// Pooled sound-effect player
///
/// Create one per application and share it as `Arc<PlaybackManager<_>>`.
/// Volume and mute are loaded from the settings store on construction and
/// written back by [`PlaybackManager::shutdown`], which also runs on drop.
///
/// Play cycles complete only when [`PlaybackManager::tick`] runs, either from
/// the host's frame loop or from a [`Ticker`](super::Ticker).
pub struct PlaybackManager<D: AudioDevice> {
    inner: Mutex<Inner<D>>,
    settings: Mutex<Box<dyn SettingsStore>>,
    events: EventBus,
}

impl<D: AudioDevice> PlaybackManager<D> {
    /// Create a manager with the default pool sizing
    pub fn new<S: SettingsStore + 'static>(device: D, settings: S) -> Self {
        Self::build(device, Box::new(settings), DEFAULT_POOL_CAPACITY, DEFAULT_MAX_IDLE)
    }

    /// Create a manager sized from configuration
    pub fn with_config<S: SettingsStore + 'static>(
        device: D,
        settings: S,
        config: &SfxConfig,
    ) -> Self {
        Self::build(
            device,
            Box::new(settings),
            config.pool_capacity,
            config.max_idle_channels,
        )
    }

    fn build(
        device: D,
        settings: Box<dyn SettingsStore>,
        capacity: usize,
        max_idle: usize,
    ) -> Self {
        let saved = AudioSettings::load(settings.as_ref());
        tracing::info!(
            "Playback manager ready (volume: {:.2}, mute: {}, pool: {}/{} idle max)",
            saved.volume,
            saved.mute,
            capacity,
            max_idle
        );

        Self {
            inner: Mutex::new(Inner {
                volume: saved.volume,
                mute: saved.mute,
                paused: false,
                shut_down: false,
                pool: ChannelPool::new(device, capacity, max_idle),
                active: Vec::with_capacity(capacity),
            }),
            settings: Mutex::new(settings),
            events: EventBus::new(),
        }
    }

    /// Play a clip without waiting for it
    pub fn play(&self, clip: &Clip) -> Result<ChannelId, AudioError> {
        let mut inner = self.inner.lock();
        let channel = inner.begin(clip, Request::Anonymous, &self.events)?;
        Ok(channel.id())
    }

    /// Play a clip and get a handle that resolves when it is done
    pub fn play_await(&self, clip: &Clip) -> Result<Completion, AudioError> {
        let mut inner = self.inner.lock();
        let channel = inner.begin(clip, Request::Anonymous, &self.events)?;
        let (signal, completion) = completion_pair(channel.id());
        channel.attach_completion(signal);
        Ok(completion)
    }

    /// Replace whatever plays under `key` with `clip`
    pub fn play_keyed(
        &self,
        clip: &Clip,
        key: &str,
        looping: bool,
    ) -> Result<ChannelId, AudioError> {
        let mut inner = self.inner.lock();
        let stopped = inner.stop_key(key);
        if stopped > 0 {
            tracing::debug!("Replacing {} channel(s) under {}", stopped, key);
        }
        let channel = inner.begin(clip, Request::Keyed { key, looping }, &self.events)?;
        Ok(channel.id())
    }

    /// Loop `clip` under `key` until stopped
    pub fn play_looped(&self, clip: &Clip, key: &str) -> Result<ChannelId, AudioError> {
        self.play_keyed(clip, key, true)
    }

    /// Stop every active channel playing under `key`.
    ///
    /// Channels leave the active set on the next tick. An empty key matches
    /// nothing: anonymous sounds cannot be stopped by key.
    pub fn stop(&self, key: &str) -> usize {
        if key.is_empty() {
            tracing::debug!("Ignoring stop for empty key");
            return 0;
        }

        let count = self.inner.lock().stop_key(key);
        if count > 0 {
            self.events.publish(PlaybackEvent::StoppedByKey {
                key: key.to_string(),
                count,
            });
        }
        count
    }

    /// Stop every active channel
    pub fn stop_all(&self) -> usize {
        let mut inner = self.inner.lock();
        if inner.shut_down {
            return 0;
        }
        for channel in inner.active.iter_mut() {
            channel.stop();
        }
        let count = inner.active.len();
        drop(inner);

        tracing::debug!("Stopped all channels ({})", count);
        self.events.publish(PlaybackEvent::StoppedAll { count });
        count
    }

    /// Pause every active channel and hold completed ones until unpaused
    pub fn pause_all(&self) {
        let mut inner = self.inner.lock();
        if inner.shut_down {
            return;
        }
        inner.paused = true;
        for channel in inner.active.iter_mut() {
            channel.pause();
        }
        drop(inner);

        self.events.publish(PlaybackEvent::PausedAll);
    }

    pub fn unpause_all(&self) {
        let mut inner = self.inner.lock();
        if inner.shut_down {
            return;
        }
        inner.paused = false;
        for channel in inner.active.iter_mut() {
            channel.unpause();
        }
        drop(inner);

        self.events.publish(PlaybackEvent::ResumedAll);
    }

    /// Set the volume for future plays and every active channel.
    /// Clamped to `[0, 1]`; NaN is ignored.
    pub fn set_volume(&self, volume: f32) {
        if volume.is_nan() {
            tracing::warn!("Ignoring NaN volume");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        let mut inner = self.inner.lock();
        if inner.shut_down {
            return;
        }
        inner.volume = volume;
        for channel in inner.active.iter_mut() {
            channel.set_volume(volume);
        }
        drop(inner);

        self.events.publish(PlaybackEvent::VolumeChanged(volume));
    }

    /// Set mute for future plays and every active channel
    pub fn set_mute(&self, mute: bool) {
        let mut inner = self.inner.lock();
        if inner.shut_down {
            return;
        }
        inner.mute = mute;
        for channel in inner.active.iter_mut() {
            channel.set_mute(mute);
        }
        drop(inner);

        self.events.publish(PlaybackEvent::MuteChanged(mute));
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().mute
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    /// Reclaim every channel whose play cycle has completed.
    /// Returns how many went back to the pool.
    pub fn tick(&self) -> usize {
        let signals = self.inner.lock().reclaim(&self.events);
        let reclaimed = signals.len();
        drop(signals);
        reclaimed
    }

    /// Snapshot of the active set
    pub fn active_channels(&self) -> Vec<ChannelInfo> {
        self.inner.lock().active.iter().map(ChannelInfo::from).collect()
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active.len()
    }

    /// True if any active channel plays under `key`
    pub fn is_key_active(&self, key: &str) -> bool {
        self.inner
            .lock()
            .active
            .iter()
            .any(|c| c.matches_key(key))
    }

    /// Ids of the channels waiting in the pool
    pub fn idle_channel_ids(&self) -> Vec<ChannelId> {
        self.inner
            .lock()
            .pool
            .idle_channels()
            .iter()
            .map(|c| c.id())
            .collect()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Subscribe to playback events
    pub fn subscribe(&self) -> (Receiver<PlaybackEvent>, SubscriberId) {
        self.events.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.events.unsubscribe(id);
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    /// Stop and destroy every channel, then persist volume and mute.
    ///
    /// Pending completions resolve. Later calls are no-ops.
    pub fn shutdown(&self) -> Result<(), SettingsError> {
        let mut signals = Vec::new();
        let saved = {
            let mut inner = self.inner.lock();
            if inner.shut_down {
                return Ok(());
            }
            inner.shut_down = true;
            inner.paused = false;

            let inner = &mut *inner;
            for mut channel in inner.active.drain(..) {
                channel.stop();
                if let Some(signal) = channel.finish() {
                    signals.push(signal);
                }
                inner.pool.destroy(channel);
            }
            inner.pool.clear();

            AudioSettings {
                volume: inner.volume,
                mute: inner.mute,
            }
        };
        drop(signals);

        self.events.publish(PlaybackEvent::Shutdown);

        let mut settings = self.settings.lock();
        saved.store(settings.as_mut());
        match settings.flush() {
            Ok(()) => {
                tracing::info!(
                    "Playback manager shut down (saved volume: {:.2}, mute: {})",
                    saved.volume,
                    saved.mute
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to save audio settings: {}", e);
                Err(e)
            }
        }
    }
}

impl<D: AudioDevice> Drop for PlaybackManager<D> {
    fn drop(&mut self) {
        // Errors are already logged by shutdown
        let _ = self.shutdown();
    }
}
