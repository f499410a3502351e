//! Maps backend HTTP failures onto [`ErrorKind`]s.

use reqwest::StatusCode;
use serde::Deserialize;

use clubdesk_core::{AppError, ErrorKind};

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres `insufficient_privilege`.
const INSUFFICIENT_PRIVILEGE: &str = "42501";

/// Which endpoint family produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The password or refresh-token grant.
    Token,
    /// Any other auth or REST endpoint.
    Data,
}

/// Error body shapes returned by the auth server and the REST layer.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn text(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
    }

    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Build an [`AppError`] from a non-success response.
///
/// The backend's own message is kept verbatim when it sent one.
pub fn from_response(endpoint: Endpoint, status: StatusCode, body: &str) -> AppError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code();
    let message = parsed.text().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected backend response")
            .to_string()
    });

    let kind = if status.is_server_error() {
        ErrorKind::BackendUnavailable
    } else if code.as_deref() == Some(UNIQUE_VIOLATION) || status == StatusCode::CONFLICT {
        ErrorKind::Conflict
    } else if code.as_deref() == Some(INSUFFICIENT_PRIVILEGE) || status == StatusCode::FORBIDDEN {
        ErrorKind::PermissionDenied
    } else if endpoint == Endpoint::Token && status.is_client_error() {
        ErrorKind::InvalidCredentials
    } else {
        match status {
            StatusCode::UNAUTHORIZED => ErrorKind::NotAuthenticated,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                ErrorKind::BackendUnavailable
            }
            _ => ErrorKind::Internal,
        }
    };

    AppError::new(kind, message)
}

/// Transport failures (DNS, refused connection, timeout) mean the backend is unreachable.
pub fn from_transport(err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::BackendUnavailable,
        format!("Backend request failed: {err}"),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_grant_failure_is_invalid_credentials() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        let err = from_response(Endpoint::Token, StatusCode::BAD_REQUEST, body);
        assert!(err.is(ErrorKind::InvalidCredentials));
        assert_eq!(err.message, "Invalid login credentials");
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"contracts_contract_no_key\""}"#;
        let err = from_response(Endpoint::Data, StatusCode::BAD_REQUEST, body);
        assert!(err.is(ErrorKind::Conflict));
    }

    #[test]
    fn test_server_error_is_unavailable() {
        let err = from_response(Endpoint::Data, StatusCode::BAD_GATEWAY, "<html>");
        assert!(err.is(ErrorKind::BackendUnavailable));
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn test_rpc_privilege_error() {
        let body = r#"{"code":"42501","message":"Only admins can manage users"}"#;
        let err = from_response(Endpoint::Data, StatusCode::BAD_REQUEST, body);
        assert!(err.is(ErrorKind::PermissionDenied));
        assert_eq!(err.message, "Only admins can manage users");
    }

    #[test]
    fn test_password_update_rejection_is_verbatim() {
        let body = r#"{"code":422,"msg":"New password should be different from the old password."}"#;
        let err = from_response(Endpoint::Data, StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(err.is(ErrorKind::Validation));
        assert_eq!(
            err.message,
            "New password should be different from the old password."
        );
    }
}
