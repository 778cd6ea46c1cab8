use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, FieldError};

/// Comment entity - immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub comment_text: String,
    pub created: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: Uuid,
        comment_text: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let comment_text = comment_text.into();
        if comment_text.trim().is_empty() {
            return Err(DomainError::Validation(vec![FieldError::new(
                "comment_text",
                "This field is required.",
            )]));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            comment_text,
            created: super::timestamp(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_comment_is_rejected() {
        let result = Comment::new(Uuid::new_v4(), Uuid::new_v4(), " \n ");
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
