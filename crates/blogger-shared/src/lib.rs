//! # Blogger Shared
//!
//! Request and response types shared by the server and its clients.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorBody};
