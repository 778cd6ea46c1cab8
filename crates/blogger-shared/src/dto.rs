//! Data Transfer Objects - request/response types for the HTTP surface.

use serde::{Deserialize, Serialize};

/// Request to create an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `?next=` on the login route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// `?page=` on listing routes. Kept as text so that garbage falls back to
/// the first page instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// Session issued at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub redirect_to: String,
}

/// Fields of the add/edit post form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Fields of the comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment_text: String,
}

/// Public view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub title: String,
    pub title_slug: String,
    pub url: String,
    pub content: String,
    pub author: String,
    pub created: String,
    pub modified: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment_text: String,
    pub author: String,
    pub created: String,
}

/// Pagination widget state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Home page listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub page: PageMeta,
}

/// A post with its conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    /// Whether the viewer may edit or delete the post.
    pub can_edit: bool,
}

/// A blogger's profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloggerProfileResponse {
    pub username: String,
    pub posts: Vec<PostResponse>,
    pub page: PageMeta,
}

/// State of a form page.
///
/// When `permitted` is false the form is withheld and `message` explains
/// why; the post itself stays visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormView<F> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostResponse>,
    pub form: Option<F>,
    pub permitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<F> FormView<F> {
    pub fn open(post: Option<PostResponse>, form: F) -> Self {
        Self {
            post,
            form: Some(form),
            permitted: true,
            message: None,
        }
    }

    pub fn denied(post: PostResponse, message: impl Into<String>) -> Self {
        Self {
            post: Some(post),
            form: None,
            permitted: false,
            message: Some(message.into()),
        }
    }
}
