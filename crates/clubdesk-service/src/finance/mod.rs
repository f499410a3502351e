//! Payments, expenses, income, and the dashboard summary.

pub mod service;

pub use service::FinanceService;
