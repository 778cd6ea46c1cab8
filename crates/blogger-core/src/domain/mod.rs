//! Domain entities - the core business objects.

mod author;
mod comment;
mod page;
mod post;
mod slug;
mod user;

use chrono::{DateTime, SubsecRound, Utc};

pub use author::Author;
pub use comment::Comment;
pub use page::{Page, PageRequest};
pub use post::{Post, PostDraft, SLUG_MAX_CHARS, TITLE_MAX_CHARS};
pub use self::slug::slugify;
pub use user::{USERNAME_MAX_CHARS, User, validate_username};

/// Current time at the microsecond precision the relational store keeps.
pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
