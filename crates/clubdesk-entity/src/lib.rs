//! # clubdesk-entity
//!
//! Domain entity models for ClubDesk. Every struct in this crate is a
//! backend row narrowed into a typed value, or a domain value object.
//! All entities derive `Debug`, `Clone`, `Serialize`, and `Deserialize`.

pub mod audit;
pub mod contract;
pub mod finance;
pub mod member;
pub mod session;
pub mod user;
