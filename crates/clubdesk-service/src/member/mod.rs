//! Players and staff.

pub mod service;

pub use service::MemberService;
