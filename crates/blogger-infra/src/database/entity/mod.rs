//! SeaORM entities for the blog schema.

pub mod author;
pub mod comment;
pub mod post;
pub mod user;
