//! Password policy enforcement.

pub mod validator;

pub use validator::PasswordValidator;
