//! Application services - the operations the HTTP layer calls.
//!
//! Each service receives the acting author explicitly and talks to storage
//! only through the repository ports.

mod authors;
mod content;

pub use authors::AuthorRegistry;
pub use content::ContentStore;
