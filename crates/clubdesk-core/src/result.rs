//! Convenience result type alias for ClubDesk.

use crate::error::AppError;

/// A specialized `Result` type for ClubDesk operations.
pub type AppResult<T> = Result<T, AppError>;
