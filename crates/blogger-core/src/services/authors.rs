use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Author;
use crate::error::{DomainError, RepoError};
use crate::ports::AuthorRepository;

/// Maps identities to their author records.
#[derive(Clone)]
pub struct AuthorRegistry {
    authors: Arc<dyn AuthorRepository>,
}

impl AuthorRegistry {
    pub fn new(authors: Arc<dyn AuthorRepository>) -> Self {
        Self { authors }
    }

    /// Return the author bound to `user_id`, creating it on first use.
    ///
    /// The unique index on the user reference decides concurrent first
    /// calls; the loser re-reads the winner's row.
    pub async fn resolve_or_create(&self, user_id: Uuid) -> Result<Author, DomainError> {
        if let Some(author) = self.authors.find_by_user_id(user_id).await? {
            return Ok(author);
        }

        match self.authors.insert(Author::new(user_id)).await {
            Ok(author) => {
                tracing::info!(author_id = %author.id, user_id = %user_id, "Author created");
                Ok(author)
            }
            Err(RepoError::Duplicate(_)) => {
                tracing::debug!(user_id = %user_id, "Author created concurrently, re-fetching");
                self.authors
                    .find_by_user_id(user_id)
                    .await?
                    .ok_or_else(|| {
                        DomainError::Internal(format!(
                            "author for user {user_id} vanished after duplicate insert"
                        ))
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the author of `user_id` without creating one.
    pub async fn find(&self, user_id: Uuid) -> Result<Option<Author>, DomainError> {
        Ok(self.authors.find_by_user_id(user_id).await?)
    }

    pub async fn usernames(&self, author_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        Ok(self.authors.usernames(author_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::ports::BaseRepository;

    /// Simulates another request committing the author between our lookup
    /// and our insert.
    struct RacingAuthors {
        winner: Author,
        committed: Mutex<bool>,
    }

    #[async_trait]
    impl BaseRepository<Author, Uuid> for RacingAuthors {
        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Author>, RepoError> {
            Ok(None)
        }

        async fn insert(&self, _author: Author) -> Result<Author, RepoError> {
            *self.committed.lock().unwrap() = true;
            Err(RepoError::Duplicate("authors.user_id".to_string()))
        }
    }

    #[async_trait]
    impl AuthorRepository for RacingAuthors {
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
            let committed = *self.committed.lock().unwrap();
            Ok((committed && user_id == self.winner.user_id).then(|| self.winner.clone()))
        }

        async fn usernames(&self, _ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
            Ok(HashMap::new())
        }
    }

    #[tokio::test]
    async fn test_lost_race_returns_winner_row() {
        let winner = Author::new(Uuid::new_v4());
        let registry = AuthorRegistry::new(Arc::new(RacingAuthors {
            winner: winner.clone(),
            committed: Mutex::new(false),
        }));

        let resolved = registry.resolve_or_create(winner.user_id).await.unwrap();

        assert_eq!(resolved, winner);
    }
}
