//! Wire DTOs for the contact-management REST backend.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Optional contact fields are
//! omitted from request bodies when blank so the backend applies its own
//! defaults instead of validating empty strings.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The authenticated account. Replaced wholesale on login/register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

/// Body returned by `POST /user/login` and `POST /user/signup`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub email_or_phone: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordData {
    pub current_password: String,
    pub new_password: String,
}

/// A stored contact owned by the current user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Request body for creating or replacing a contact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ContactInput {
    /// Build an input, dropping optional fields that are blank.
    #[must_use]
    pub fn new(first_name: &str, last_name: Option<&str>, email: &str, phone_number: Option<&str>) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: non_blank(last_name),
            email: email.to_string(),
            phone_number: non_blank(phone_number),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(ToString::to_string)
}

/// Error body produced by the backend's exception handler.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}
