//! Background tasks feeding the session manager.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use clubdesk_core::events::AuthEvent;

/// What the auth-event listener hands to its handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerSignal {
    /// A provider event, in order.
    Event(AuthEvent),
    /// Events were dropped; the handler must reconcile from scratch.
    Lagged(u64),
}

/// Forward provider events to `handler` until the channel closes or the
/// handler returns `false`.
pub fn spawn_event_listener<H, Fut>(
    mut events: broadcast::Receiver<AuthEvent>,
    handler: H,
) -> JoinHandle<()>
where
    H: Fn(ListenerSignal) -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let signal = match events.recv().await {
                Ok(event) => {
                    debug!(event = event.name(), "Auth event received");
                    ListenerSignal::Event(event)
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Auth event listener lagged");
                    ListenerSignal::Lagged(skipped)
                }
                Err(RecvError::Closed) => {
                    debug!("Auth event channel closed");
                    return;
                }
            };
            if !handler(signal).await {
                return;
            }
        }
    })
}

/// Call `tick` every `every` (first call after one full interval) until it
/// returns `false`.
pub fn spawn_periodic<T, Fut>(every: Duration, tick: T) -> JoinHandle<()>
where
    T: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        loop {
            interval.tick().await;
            if !tick().await {
                return;
            }
        }
    })
}
