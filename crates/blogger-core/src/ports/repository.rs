use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Author, Comment, PageRequest, Post, User};
use crate::error::RepoError;

/// Generic repository trait shared by every entity.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity. Unique-index violations surface as
    /// [`RepoError::Duplicate`].
    async fn insert(&self, entity: T) -> Result<T, RepoError>;
}

/// Identity storage.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Delete a user together with its author, that author's posts, every
    /// comment on those posts and every comment the author wrote. All or
    /// nothing.
    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Author storage. At most one author per user.
#[async_trait]
pub trait AuthorRepository: BaseRepository<Author, Uuid> {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError>;

    /// Usernames of the given authors, keyed by author id.
    async fn usernames(&self, author_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError>;
}

/// Post storage. Listings are ordered newest-created first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Overwrite an existing post. Fails with [`RepoError::NotFound`] when the
    /// row is gone and [`RepoError::Duplicate`] when the slug is taken.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Count posts, optionally restricted to one author.
    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError>;

    /// Fetch one page of posts, optionally restricted to one author.
    async fn find_page(
        &self,
        author_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError>;

    /// Delete a post and all of its comments in one transaction.
    async fn delete_with_comments(&self, post_id: Uuid) -> Result<(), RepoError>;
}

/// Comment storage.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first. Comments written in the same
    /// microsecond are ordered by id.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;
}
