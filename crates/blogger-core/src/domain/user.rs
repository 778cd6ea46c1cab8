use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldError};

pub const USERNAME_MAX_CHARS: usize = 150;

/// User entity - an identity that can sign in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, password_hash: String) -> Self {
        let now = super::timestamp();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Usernames are 1-150 characters of letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    let message = if username.is_empty() {
        Some("This field is required.".to_string())
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        Some(format!(
            "Ensure this value has at most {USERNAME_MAX_CHARS} characters."
        ))
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Some(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .to_string(),
        )
    } else {
        None
    };

    match message {
        Some(message) => Err(DomainError::Validation(vec![FieldError::new(
            "username", message,
        )])),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_punctuated_usernames() {
        assert!(validate_username("edith123").is_ok());
        assert!(validate_username("e.dith+blog@home_1-x").is_ok());
    }

    #[test]
    fn test_rejects_empty_and_spaces() {
        assert!(validate_username("").is_err());
        assert!(validate_username("edith smith").is_err());
    }

    #[test]
    fn test_rejects_overlong() {
        let name = "a".repeat(USERNAME_MAX_CHARS + 1);
        assert!(validate_username(&name).is_err());
    }
}
