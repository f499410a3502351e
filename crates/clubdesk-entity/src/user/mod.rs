//! User domain entities.

pub mod profile;
pub mod role;

pub use profile::{CreateUser, UpdateUser, UserProfile};
pub use role::Role;
