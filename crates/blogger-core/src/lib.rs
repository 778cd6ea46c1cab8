//! # Blogger Core
//!
//! The domain layer of the blogger application: authors, posts, comments,
//! the ownership gate and slug derivation.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod authz;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, FieldError, RepoError};
pub use services::{AuthorRegistry, ContentStore};
