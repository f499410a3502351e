//! Member contract entities.

pub mod model;
pub mod number;

pub use model::{Contract, ContractDraft, ContractStatus, ContractStatusChange, ContractType};
pub use number::ContractNumber;
