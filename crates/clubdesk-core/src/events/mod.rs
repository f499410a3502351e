//! Events pushed by external collaborators.

pub mod auth;

pub use auth::AuthEvent;
