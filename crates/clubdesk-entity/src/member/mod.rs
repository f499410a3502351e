//! Player and staff member entities.

pub mod model;
pub mod payments;

pub use model::{Member, MemberDraft, MemberType};
pub use payments::MemberPayments;
