//! Session lifecycle: sign-in, sign-out, profile resolution, idle expiry.

pub mod listener;
pub mod manager;
pub mod watchdog;

pub use manager::{IDLE_TIMEOUT, SessionManager};
pub use watchdog::IdleWatchdog;
