//! # clubdesk-backend
//!
//! The seams between ClubDesk and the hosted backend. [`traits`] defines
//! one store per backend concern; [`rest`] talks to the hosted auth + REST
//! API and [`memory`] keeps everything in process for tests and offline
//! use. [`Backend`] picks one from configuration.

pub mod backend;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "rest")]
pub mod rest;
pub mod traits;

pub use backend::Backend;
pub use traits::{
    AuditLogStore, ContractStore, CredentialStore, LedgerStore, MemberStore, ProfileStore,
};
