//! In-memory storage - used when no database is configured, and in tests.
//!
//! Enforces the same unique keys and references as the PostgreSQL schema.
//! Every operation runs under a single lock, so cascades are atomic.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogger_core::domain::{Author, Comment, PageRequest, Post, User};
use blogger_core::error::RepoError;
use blogger_core::ports::{
    AuthorRepository, BaseRepository, CommentRepository, PostRepository, UserRepository,
};

/// Rows in insertion order.
#[derive(Default)]
struct Tables {
    users: Vec<User>,
    authors: Vec<Author>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

impl Tables {
    /// Posts matching the filter, newest first. Equal timestamps fall back to
    /// reverse insertion order.
    fn posts_newest_first(&self, author_id: Option<Uuid>) -> Vec<&Post> {
        let mut rows: Vec<(usize, &Post)> = self
            .posts
            .iter()
            .enumerate()
            .filter(|(_, p)| author_id.is_none_or(|id| p.author_id == id))
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| b.created.cmp(&a.created).then(ib.cmp(ia)));
        rows.into_iter().map(|(_, p)| p).collect()
    }
}

/// Blog storage held in process memory.
#[derive(Default)]
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Duplicate("users.username".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.users.iter().position(|u| u.id == id) else {
            return Err(RepoError::NotFound);
        };

        if let Some(author_id) = tables
            .authors
            .iter()
            .find(|a| a.user_id == id)
            .map(|a| a.id)
        {
            let owned_posts: Vec<Uuid> = tables
                .posts
                .iter()
                .filter(|p| p.author_id == author_id)
                .map(|p| p.id)
                .collect();

            tables
                .comments
                .retain(|c| c.author_id != author_id && !owned_posts.contains(&c.post_id));
            tables.posts.retain(|p| p.author_id != author_id);
            tables.authors.retain(|a| a.id != author_id);
        }

        tables.users.remove(index);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Author, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.authors.iter().find(|a| a.id == id).cloned())
    }

    async fn insert(&self, author: Author) -> Result<Author, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == author.user_id) {
            return Err(RepoError::Constraint(
                "authors.user_id references a missing user".to_string(),
            ));
        }
        if tables.authors.iter().any(|a| a.user_id == author.user_id) {
            return Err(RepoError::Duplicate("authors.user_id".to_string()));
        }
        tables.authors.push(author.clone());
        Ok(author)
    }
}

#[async_trait]
impl AuthorRepository for InMemoryBlogStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.authors.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn usernames(&self, author_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .iter()
            .filter(|a| author_ids.contains(&a.id))
            .filter_map(|a| {
                tables
                    .users
                    .iter()
                    .find(|u| u.id == a.user_id)
                    .map(|u| (a.id, u.username.clone()))
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.authors.iter().any(|a| a.id == post.author_id) {
            return Err(RepoError::Constraint(
                "posts.author_id references a missing author".to_string(),
            ));
        }
        if tables.posts.iter().any(|p| p.title_slug == post.title_slug) {
            return Err(RepoError::Duplicate("posts.title_slug".to_string()));
        }
        tables.posts.push(post.clone());
        Ok(post)
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.title_slug == slug).cloned())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .posts
            .iter()
            .any(|p| p.id != post.id && p.title_slug == post.title_slug)
        {
            return Err(RepoError::Duplicate("posts.title_slug".to_string()));
        }
        let row = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *row = post.clone();
        Ok(post)
    }

    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id))
            .count() as u64)
    }

    async fn find_page(
        &self,
        author_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts_newest_first(author_id)
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .cloned()
            .collect())
    }

    async fn delete_with_comments(&self, post_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.posts.iter().position(|p| p.id == post_id) else {
            return Err(RepoError::NotFound);
        };
        tables.comments.retain(|c| c.post_id != post_id);
        tables.posts.remove(index);
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryBlogStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(RepoError::Constraint(
                "comments.post_id references a missing post".to_string(),
            ));
        }
        if !tables.authors.iter().any(|a| a.id == comment.author_id) {
            return Err(RepoError::Constraint(
                "comments.author_id references a missing author".to_string(),
            ));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        // Same order as the relational store: equal timestamps fall back to id.
        comments.sort_by_key(|c| (c.created, c.id));
        Ok(comments)
    }
}
