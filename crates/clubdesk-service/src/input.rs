//! Turns `validator` failures into application errors.

use validator::Validate;

use clubdesk_core::AppError;
use clubdesk_core::result::AppResult;

/// Runs derived validation and joins every message into one `Validation` error.
pub(crate) fn check<T: Validate>(value: &T) -> AppResult<()> {
    value.validate().map_err(|errors| {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::validation(messages.join("; "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubdesk_core::ErrorKind;
    use clubdesk_entity::user::{CreateUser, Role};

    #[test]
    fn test_messages_are_joined() {
        let user = CreateUser {
            email: "not-an-email".into(),
            password: "secret1".into(),
            full_name: String::new(),
            role: Role::Staff,
        };
        let err = check(&user).unwrap_err();
        assert!(err.is(ErrorKind::Validation));
        assert_eq!(
            err.message,
            "A valid email address is required; Full name is required"
        );
    }
}
