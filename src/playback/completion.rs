/// Completion of a single play cycle
///
/// The manager holds the [`CompletionSignal`] inside the channel. The caller of
/// `play_await` holds the [`Completion`]. Dropping the signal completes it, so
/// an awaiter can never be left hanging by a channel that is torn down.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::channel::ChannelId;

#[derive(Default)]
struct State {
    done: bool,
    waker: Option<Waker>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    cond: Condvar,
}

/// Create a linked signal/completion pair for one play cycle
pub(crate) fn completion_pair(channel: ChannelId) -> (CompletionSignal, Completion) {
    let shared = Arc::new(Shared::default());
    (
        CompletionSignal {
            shared: Arc::clone(&shared),
        },
        Completion { shared, channel },
    )
}

/// Manager-side half, fired when dropped
pub(crate) struct CompletionSignal {
    shared: Arc<Shared>,
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        let waker = {
            let mut state = self.shared.state.lock();
            state.done = true;
            state.waker.take()
        };
        self.shared.cond.notify_all();
        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// Handle returned by `PlaybackManager::play_await`
///
/// Resolves once the sound has finished and its channel is back in the pool.
/// Progress needs the manager to be ticked. Blocking on [`Completion::wait`]
/// from the thread that ticks the manager never returns.
pub struct Completion {
    shared: Arc<Shared>,
    channel: ChannelId,
}

impl Completion {
    /// Channel that played the sound
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn is_done(&self) -> bool {
        self.shared.state.lock().done
    }

    /// Block until the play cycle completes
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        while !state.done {
            self.shared.cond.wait(&mut state);
        }
    }

    /// Block for at most `timeout`. Returns true if the cycle completed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut state = self.shared.state.lock();
        if !state.done {
            self.shared.cond.wait_while_for(&mut state, |s| !s.done, timeout);
        }
        state.done
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.shared.state.lock();
        if state.done {
            return Poll::Ready(());
        }
        match &state.waker {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            _ => state.waker = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("channel", &self.channel)
            .field("done", &self.is_done())
            .finish()
    }
}
