use std::sync::Arc;

use uuid::Uuid;

use crate::authz;
use crate::domain::{Author, Comment, Page, PageRequest, Post, PostDraft};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository};

const TITLE_TAKEN: &str = "A post with this title already exists. Please choose another title.";

/// Posts and comments, with their validation and ownership rules.
#[derive(Clone)]
pub struct ContentStore {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

/// Unique-slug violations become a user-facing conflict.
fn slug_conflict(err: RepoError) -> DomainError {
    match err {
        RepoError::Duplicate(_) => DomainError::Duplicate(TITLE_TAKEN.to_string()),
        other => other.into(),
    }
}

impl ContentStore {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn create_post(&self, author: &Author, draft: PostDraft) -> Result<Post, DomainError> {
        let post = Post::new(author.id, draft)?;
        let saved = self.posts.insert(post).await.map_err(slug_conflict)?;

        tracing::info!(
            post_id = %saved.id,
            slug = %saved.title_slug,
            author_id = %author.id,
            "Post created"
        );
        Ok(saved)
    }

    /// Replace the title and content of `post` on behalf of `actor`.
    pub async fn update_post(
        &self,
        actor: &Author,
        mut post: Post,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        authz::ensure_can_mutate(actor, &post)?;

        let previous_slug = post.title_slug.clone();
        post.revise(draft)?;

        let saved = self.posts.update(post).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::not_found("Post", previous_slug.as_str()),
            other => slug_conflict(other),
        })?;

        tracing::info!(
            post_id = %saved.id,
            from = %previous_slug,
            to = %saved.title_slug,
            "Post updated"
        );
        Ok(saved)
    }

    pub async fn get_post(&self, slug: &str) -> Result<Post, DomainError> {
        tracing::debug!(slug = %slug, "Finding post by slug");

        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }

    /// One page of all posts, newest first. Out-of-range page numbers are
    /// clamped to the first or last page.
    pub async fn list_posts(&self, request: PageRequest) -> Result<Page<Post>, DomainError> {
        self.page_of(None, request).await
    }

    /// One page of the posts owned by `author`, newest first.
    pub async fn list_posts_by_author(
        &self,
        author: &Author,
        request: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        self.page_of(Some(author.id), request).await
    }

    async fn page_of(
        &self,
        author_id: Option<Uuid>,
        request: PageRequest,
    ) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count(author_id).await?;
        let request = request.clamp(total);
        let items = self.posts.find_page(author_id, request).await?;

        Ok(Page::new(items, request, total))
    }

    /// Delete `post` and its comments on behalf of `actor`.
    pub async fn delete_post(&self, actor: &Author, post: &Post) -> Result<(), DomainError> {
        authz::ensure_can_mutate(actor, post)?;

        self.posts
            .delete_with_comments(post.id)
            .await
            .map_err(|e| match e {
                RepoError::NotFound => DomainError::not_found("Post", post.title_slug.as_str()),
                other => other.into(),
            })?;

        tracing::info!(post_id = %post.id, slug = %post.title_slug, "Post deleted");
        Ok(())
    }

    /// Any author may comment on any post.
    pub async fn add_comment(
        &self,
        post: &Post,
        author: &Author,
        comment_text: &str,
    ) -> Result<Comment, DomainError> {
        let comment = Comment::new(post.id, author.id, comment_text)?;

        let saved = self
            .comments
            .insert(comment)
            .await
            .map_err(|e| match e {
                // The post was deleted between lookup and insert.
                RepoError::Constraint(_) => {
                    DomainError::not_found("Post", post.title_slug.as_str())
                }
                other => other.into(),
            })?;

        tracing::info!(
            comment_id = %saved.id,
            post_id = %post.id,
            author_id = %author.id,
            "Comment added"
        );
        Ok(saved)
    }

    /// Comments of `post`, oldest first.
    pub async fn list_comments(&self, post: &Post) -> Result<Vec<Comment>, DomainError> {
        Ok(self.comments.find_by_post(post.id).await?)
    }
}
