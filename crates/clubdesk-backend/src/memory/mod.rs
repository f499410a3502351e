//! Process-local backend used by tests and offline demos.

pub mod audit;
pub mod auth;
pub mod contracts;
pub mod ledger;
pub mod members;

pub use audit::MemoryAuditLog;
pub use auth::{CallCounts, MemoryAuthBackend};
pub use contracts::MemoryContractStore;
pub use ledger::MemoryLedgerStore;
pub use members::MemoryMemberStore;
