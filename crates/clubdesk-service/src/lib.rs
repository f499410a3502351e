//! # clubdesk-service
//!
//! Domain flows that consume the session. Each service checks the
//! actor's capability before it touches a store, so a denied action never
//! reaches the backend.
//!
//! Services follow constructor injection: stores are handed in as
//! `Arc<dyn ...>` at construction time.

pub mod audit;
pub mod context;
pub mod contract;
pub mod finance;
mod input;
pub mod member;
pub mod user;

pub use audit::AuditService;
pub use context::ActorContext;
pub use contract::ContractService;
pub use finance::FinanceService;
pub use member::MemberService;
pub use user::UserAdminService;
