//! Application state - shared across all handlers.

use std::sync::Arc;

use blogger_core::ports::{
    AuthorRepository, CommentRepository, PasswordService, PostRepository, TokenService,
    UserRepository,
};
use blogger_core::{AuthorRegistry, ContentStore};
use blogger_infra::{Argon2PasswordService, InMemoryBlogStore, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use blogger_infra::database::{
    PostgresAuthorRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository, connect,
};

use crate::config::{AppConfig, BlogSettings};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub authors: AuthorRegistry,
    pub content: ContentStore,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub settings: BlogSettings,
}

/// The four storage ports, from one backend.
struct Repositories {
    users: Arc<dyn UserRepository>,
    authors: Arc<dyn AuthorRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let store = Arc::new(InMemoryBlogStore::new());
        Self {
            users: store.clone(),
            authors: store.clone(),
            posts: store.clone(),
            comments: store,
        }
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig::from_env()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        #[cfg(feature = "postgres")]
        let repositories = match &config.database {
            Some(db_config) => match connect(db_config).await {
                Ok(db) => Repositories {
                    users: Arc::new(PostgresUserRepository::new(db.clone())),
                    authors: Arc::new(PostgresAuthorRepository::new(db.clone())),
                    posts: Arc::new(PostgresPostRepository::new(db.clone())),
                    comments: Arc::new(PostgresCommentRepository::new(db)),
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Repositories::in_memory()
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory()
            }
        };

        #[cfg(not(feature = "postgres"))]
        let repositories = {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Repositories::in_memory()
        };

        tracing::info!("Application state initialized");

        Self::assemble(repositories, config.blog.clone(), tokens, passwords)
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(
        settings: BlogSettings,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self::assemble(Repositories::in_memory(), settings, tokens, passwords)
    }

    fn assemble(
        repositories: Repositories,
        settings: BlogSettings,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users: repositories.users,
            authors: AuthorRegistry::new(repositories.authors),
            content: ContentStore::new(repositories.posts, repositories.comments),
            tokens,
            passwords,
            settings,
        }
    }
}
