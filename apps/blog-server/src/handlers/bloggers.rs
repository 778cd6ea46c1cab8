//! Blogger profile pages.

use actix_web::{HttpResponse, web};

use blogger_core::domain::PageRequest;
use blogger_shared::dto::{BloggerProfileResponse, PageQuery};

use super::render::{page_number, post_page};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /bloggers/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();
    tracing::debug!(username = %username, "Loading blogger profile");

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blogger {} not found", username)))?;

    let author = state.authors.resolve_or_create(user.id).await?;

    let request = PageRequest::new(page_number(&query), state.settings.posts_per_page);
    let page = state.content.list_posts_by_author(&author, request).await?;
    let (posts, page) = post_page(&state, &page).await?;

    Ok(HttpResponse::Ok().json(BloggerProfileResponse {
        username: user.username,
        posts,
        page,
    }))
}
