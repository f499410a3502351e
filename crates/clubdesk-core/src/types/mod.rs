//! Core type definitions used across the ClubDesk workspace.

pub mod id;
pub mod identity;

pub use id::*;
pub use identity::Identity;
