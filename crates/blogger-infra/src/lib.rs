//! # Blogger Infrastructure
//!
//! Concrete implementations of the ports defined in `blogger-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory storage only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT sessions + Argon2 password hashing

pub mod database;
pub mod memory;

#[cfg(feature = "auth")]
pub mod auth;

pub use database::DatabaseConfig;
pub use memory::InMemoryBlogStore;

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
