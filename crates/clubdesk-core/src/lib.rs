//! # clubdesk-core
//!
//! Core crate for ClubDesk. Contains configuration schemas, typed
//! identifiers, the authenticated [`Identity`](types::Identity),
//! credential-provider events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ClubDesk crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
