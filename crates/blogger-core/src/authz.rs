//! Ownership gate for post mutations.
//!
//! Stateless: the acting author is always passed in by the caller, the gate
//! never looks at session state.

use crate::domain::{Author, Post};
use crate::error::DomainError;

/// True iff `actor` owns `post`.
pub fn can_mutate(actor: &Author, post: &Post) -> bool {
    actor.id == post.author_id
}

/// Same check as [`can_mutate`], as a `Result` for `?` chains.
pub fn ensure_can_mutate(actor: &Author, post: &Post) -> Result<(), DomainError> {
    if can_mutate(actor, post) {
        Ok(())
    } else {
        tracing::warn!(
            actor = %actor.id,
            owner = %post.author_id,
            slug = %post.title_slug,
            "Refused mutation by non-owner"
        );
        Err(DomainError::PermissionDenied)
    }
}
