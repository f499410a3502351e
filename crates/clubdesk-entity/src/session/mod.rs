//! Session state exposed to views.

pub mod activity;
pub mod model;

pub use activity::ActivitySignal;
pub use model::{SessionPhase, SessionSnapshot};
