use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slugify;
use crate::error::{DomainError, FieldError};

pub const TITLE_MAX_CHARS: usize = 255;
/// Width of the `title_slug` column.
pub const SLUG_MAX_CHARS: usize = 255;

/// Post entity - a blog post owned by one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub title_slug: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// User-supplied fields of a post, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

impl PostDraft {
    /// Surrounding whitespace of the title is dropped.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();

        let title_len = self.title.chars().count();
        let slug = slugify(&self.title);
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "This field is required."));
        } else if title_len > TITLE_MAX_CHARS {
            errors.push(FieldError::new(
                "title",
                format!(
                    "Ensure this value has at most {TITLE_MAX_CHARS} characters (it has {title_len})."
                ),
            ));
        } else if slug.is_empty() {
            errors.push(FieldError::new(
                "title",
                "Title must contain at least one letter or digit.",
            ));
        } else if slug.len() > SLUG_MAX_CHARS {
            errors.push(FieldError::new(
                "title",
                format!(
                    "Title is too long once converted to a URL (at most {SLUG_MAX_CHARS} characters)."
                ),
            ));
        }

        if self.content.trim().is_empty() {
            errors.push(FieldError::new("content", "This field is required."));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(errors))
        }
    }
}

impl Post {
    /// Create a new post from a validated draft.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Result<Self, DomainError> {
        draft.validate()?;

        let now = super::timestamp();
        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            title_slug: slugify(&draft.title),
            title: draft.title,
            content: draft.content,
            created: now,
            modified: now,
        })
    }

    /// Replace title and content, re-deriving the slug.
    ///
    /// `created` is kept; `modified` always moves forward, even when the
    /// clock has not advanced past the previous value.
    pub fn revise(&mut self, draft: PostDraft) -> Result<(), DomainError> {
        draft.validate()?;

        self.title_slug = slugify(&draft.title);
        self.title = draft.title;
        self.content = draft.content;

        let now = super::timestamp();
        self.modified = if now > self.modified {
            now
        } else {
            self.modified + Duration::microseconds(1)
        };
        Ok(())
    }

    /// Canonical URL path of the post.
    pub fn url(&self) -> String {
        format!("/posts/{}/", self.title_slug)
    }
}
