/// Background scheduler tick
///
/// Drives `PlaybackManager::tick` at a fixed cadence for hosts that have no
/// frame loop of their own.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};

use super::manager::PlaybackManager;
use crate::device::AudioDevice;

/// Handle to the ticking thread. Stops the thread when dropped.
pub struct Ticker {
    shutdown_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking `manager` every `interval`
    pub fn spawn<D: AudioDevice>(
        manager: Arc<PlaybackManager<D>>,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);

        let handle = thread::Builder::new()
            .name("sfx-ticker".to_string())
            .spawn(move || {
                tracing::debug!("Ticker thread started ({:?} interval)", interval);

                loop {
                    match shutdown_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if manager.is_shut_down() {
                                break;
                            }
                            manager.tick();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                tracing::debug!("Ticker thread stopped");
            })?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the thread and wait for it to exit
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Ticker thread panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
