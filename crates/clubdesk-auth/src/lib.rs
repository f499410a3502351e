//! # clubdesk-auth
//!
//! Who is signed in, with what role, and whether that session is still
//! valid.
//!
//! ## Modules
//!
//! - `session` - session lifecycle, idle watchdog, and auth-event listener
//! - `rbac` - role-to-capability policy and enforcement
//! - `password` - local password policy applied before the provider is called

pub mod password;
pub mod rbac;
pub mod session;

pub use password::PasswordValidator;
pub use rbac::{Capability, RbacEnforcer, RbacPolicies, Section};
pub use session::{IDLE_TIMEOUT, SessionManager};
