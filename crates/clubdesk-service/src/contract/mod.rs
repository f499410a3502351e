//! Member contracts.

pub mod service;

pub use service::ContractService;
