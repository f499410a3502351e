//! Role-based access control (RBAC) enforcement.

pub mod enforcer;
pub mod navigation;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use navigation::Section;
pub use policies::{Capability, RbacPolicies};
