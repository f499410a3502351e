//! Password policy enforcement for new passwords.

use clubdesk_core::config::AuthConfig;
use clubdesk_core::error::AppError;

/// Validates new passwords before they are sent to the provider.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length, in characters.
    min_length: usize,
    /// Minimum zxcvbn score; `None` skips the estimate.
    min_strength: Option<zxcvbn::Score>,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let min_strength = match config.password_min_strength {
            0 => None,
            1 => Some(zxcvbn::Score::One),
            2 => Some(zxcvbn::Score::Two),
            3 => Some(zxcvbn::Score::Three),
            _ => Some(zxcvbn::Score::Four),
        };
        Self {
            min_length: config.password_min_length,
            min_strength,
        }
    }

    /// Minimum password length this validator enforces.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validates a password against the configured policy.
    ///
    /// Returns a `WeakPassword` error describing the first violation.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::weak_password(format!(
                "Password must be at least {} characters.",
                self.min_length
            )));
        }

        if let Some(min) = &self.min_strength {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if estimate.score() < *min {
                return Err(AppError::weak_password(
                    "Password is too weak. Please use a stronger password.",
                ));
            }
        }

        Ok(())
    }

    /// Validates a new password and its confirmation.
    pub fn validate_with_confirmation(
        &self,
        password: &str,
        confirmation: &str,
    ) -> Result<(), AppError> {
        self.validate(password)?;
        if password != confirmation {
            return Err(AppError::weak_password(
                "Password confirmation does not match.",
            ));
        }
        Ok(())
    }
}
