//! Client-side form rules, checked before anything is sent.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use crate::error::ClientError;
use crate::net::types::ContactInput;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Password plus confirmation, as entered on the registration form.
///
/// # Errors
///
/// Returns `Validation` if the two differ or the password is too short.
pub fn validate_new_account_password(password: &str, confirm: &str) -> Result<(), ClientError> {
    if password != confirm {
        return Err(ClientError::Validation("Passwords do not match.".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }
    Ok(())
}

/// New password plus confirmation, as entered on the change-password form.
///
/// # Errors
///
/// Returns `Validation` if the two differ or the password is too short.
pub fn validate_password_change(new_password: &str, confirm: &str) -> Result<(), ClientError> {
    if new_password != confirm {
        return Err(ClientError::Validation("New passwords do not match.".into()));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters long."
        )));
    }
    Ok(())
}

/// # Errors
///
/// Returns `Validation` if the first name or email is blank.
pub fn validate_contact(input: &ContactInput) -> Result<(), ClientError> {
    if input.first_name.trim().is_empty() {
        return Err(ClientError::Validation("First name is required.".into()));
    }
    if input.email.trim().is_empty() {
        return Err(ClientError::Validation("Email is required.".into()));
    }
    Ok(())
}
