//! Resettable idle timer.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// A one-shot timer that fires after `timeout` without a [`touch`](Self::touch).
///
/// Dropping the watchdog disarms it. The expiry callback runs on its own
/// task, so disarming from inside the callback cannot cancel it.
#[derive(Debug)]
pub struct IdleWatchdog {
    touches: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl IdleWatchdog {
    /// Start the timer. `on_expire` runs at most once.
    pub fn arm<F, Fut>(timeout: Duration, on_expire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (touches, mut rx) = mpsc::channel::<()>(1);

        let handle = tokio::spawn(async move {
            let deadline = sleep(timeout);
            tokio::pin!(deadline);

            loop {
                tokio::select! {
                    () = &mut deadline => {
                        debug!(timeout_secs = timeout.as_secs(), "Idle watchdog fired");
                        tokio::spawn(on_expire());
                        return;
                    }
                    touched = rx.recv() => match touched {
                        Some(()) => deadline.as_mut().reset(Instant::now() + timeout),
                        None => return,
                    },
                }
            }
        });

        Self { touches, handle }
    }

    /// Push the deadline out to a full timeout from now.
    pub fn touch(&self) {
        // A full channel already holds a pending reset.
        let _ = self.touches.try_send(());
    }

    /// Whether the timer is still waiting.
    pub fn is_armed(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the timer without firing.
    pub fn disarm(self) {}
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
