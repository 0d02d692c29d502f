use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use validator::{Validate, ValidationError, ValidationErrors};

use super::repo_types::{User, UserFields};

/// Request body for `POST /users`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for `PUT /users/:id`.
///
/// Each field distinguishes "absent" (`None`) from "explicitly null"
/// (`Some(None)`); only present fields are merged into the stored row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub bio: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match &self.name {
            Some(None) => errors.add("name", field_error("null", "name may not be null")),
            Some(Some(name)) if name.is_empty() => {
                errors.add("name", field_error("length", "name must not be empty"))
            }
            _ => {}
        }
        if let Some(None) = &self.email {
            errors.add("email", field_error("null", "email may not be null"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl UserUpdate {
    /// Merge this patch over `current`, keeping every field that was not sent.
    pub fn apply_to(&self, current: &User) -> UserFields {
        UserFields {
            name: match &self.name {
                Some(Some(name)) => name.clone(),
                _ => current.name.clone(),
            },
            email: match &self.email {
                Some(Some(email)) => email.clone(),
                _ => current.email.clone(),
            },
            bio: match &self.bio {
                Some(bio) => bio.clone(),
                None => current.bio.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            bio: u.bio,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
