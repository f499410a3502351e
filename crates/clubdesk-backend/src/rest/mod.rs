//! Client for the hosted auth + REST backend.
//!
//! One [`RestClient`] implements every store trait. It keeps the provider
//! session in process memory only; nothing is written to disk.

pub mod client;
pub mod error;
pub mod rows;

mod audit;
mod auth;
mod contracts;
mod ledger;
mod members;
mod profiles;

pub use client::RestClient;
