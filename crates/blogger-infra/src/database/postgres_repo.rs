//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use blogger_core::domain::{Author, Comment, PageRequest, Post, User};
use blogger_core::error::RepoError;
use blogger_core::ports::{AuthorRepository, CommentRepository, PostRepository, UserRepository};

use super::entity::author::{self, Entity as AuthorEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL author repository.
pub type PostgresAuthorRepository = PostgresBaseRepository<AuthorEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let author = AuthorEntity::find()
            .filter(author::Column::UserId.eq(id))
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        if let Some(author) = author {
            let owned_posts: Vec<Uuid> = PostEntity::find()
                .select_only()
                .column(post::Column::Id)
                .filter(post::Column::AuthorId.eq(author.id))
                .into_tuple()
                .all(&txn)
                .await
                .map_err(map_db_err)?;

            let comments = CommentEntity::delete_many()
                .filter(
                    Condition::any()
                        .add(comment::Column::AuthorId.eq(author.id))
                        .add(comment::Column::PostId.is_in(owned_posts)),
                )
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            let posts = PostEntity::delete_many()
                .filter(post::Column::AuthorId.eq(author.id))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
            AuthorEntity::delete_by_id(author.id)
                .exec(&txn)
                .await
                .map_err(map_db_err)?;

            tracing::debug!(
                author_id = %author.id,
                posts = posts.rows_affected,
                comments = comments.rows_affected,
                "Removed author content"
            );
        }

        let deleted = UserEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        if deleted.rows_affected == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Author>, RepoError> {
        let result = AuthorEntity::find()
            .filter(author::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn usernames(&self, author_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, RepoError> {
        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = AuthorEntity::find()
            .filter(author::Column::Id.is_in(author_ids.iter().copied()))
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .filter_map(|(author, user)| user.map(|u| (author.id, u.username)))
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::TitleSlug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.update(&self.db).await.map_err(map_db_err)?;

        Ok(model.into())
    }

    async fn count(&self, author_id: Option<Uuid>) -> Result<u64, RepoError> {
        let mut query = PostEntity::find();
        if let Some(author_id) = author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }

        query.count(&self.db).await.map_err(map_db_err)
    }

    async fn find_page(
        &self,
        author_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = PostEntity::find();
        if let Some(author_id) = author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }

        let result = query
            .order_by_desc(post::Column::Created)
            .order_by_desc(post::Column::Id)
            .offset(page.offset())
            .limit(page.size)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_with_comments(&self, post_id: Uuid) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let comments = CommentEntity::delete_many()
            .filter(comment::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let deleted = PostEntity::delete_by_id(post_id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        if deleted.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(post_id = %post_id, comments = comments.rows_affected, "Post rows removed");
        Ok(())
    }
}

/// Comments of a post, oldest first with ties broken by id.
pub(crate) fn comments_of(post_id: Uuid) -> Select<CommentEntity> {
    CommentEntity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .order_by_asc(comment::Column::Created)
        .order_by_asc(comment::Column::Id)
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = comments_of(post_id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}
