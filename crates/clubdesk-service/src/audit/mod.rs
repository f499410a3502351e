//! Change history.

pub mod service;

pub use service::AuditService;
