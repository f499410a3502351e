//! Unified application error types for ClubDesk.
//!
//! Store clients, the session manager, and the domain services all
//! return [`AppError`], so a view only ever has to match on
//! [`ErrorKind`] to decide what to show.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Bad email or password. Never says which one was wrong.
    InvalidCredentials,
    /// Credentials were valid but the profile is blocked.
    AccountBlocked,
    /// A new password failed local validation.
    WeakPassword,
    /// The current role lacks the capability for the action.
    PermissionDenied,
    /// The hosted backend could not be reached or answered with a server error.
    BackendUnavailable,
    /// The operation requires an authenticated session.
    NotAuthenticated,
    /// Input validation failed.
    Validation,
    /// The requested record was not found.
    NotFound,
    /// A uniqueness or state conflict occurred.
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "INVALID_CREDENTIALS"),
            Self::AccountBlocked => write!(f, "ACCOUNT_BLOCKED"),
            Self::WeakPassword => write!(f, "WEAK_PASSWORD"),
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::BackendUnavailable => write!(f, "BACKEND_UNAVAILABLE"),
            Self::NotAuthenticated => write!(f, "NOT_AUTHENTICATED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout ClubDesk.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentials, message)
    }

    /// Create an account-blocked error.
    pub fn account_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccountBlocked, message)
    }

    /// Create a weak-password error.
    pub fn weak_password(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WeakPassword, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, message)
    }

    /// Create a backend-unavailable error.
    pub fn backend_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BackendUnavailable, message)
    }

    /// Create a not-authenticated error.
    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Returns `true` if this error has the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
