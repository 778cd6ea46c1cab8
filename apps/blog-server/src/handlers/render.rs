//! Domain values to wire DTOs.

use std::collections::HashMap;

use actix_web::web;
use uuid::Uuid;

use blogger_core::domain::{Comment, Page, Post};
use blogger_shared::dto::{CommentResponse, PageMeta, PageQuery, PostResponse};

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Shown when an author disappears between two reads.
const UNKNOWN_AUTHOR: &str = "(deleted)";

/// `?page=` as a page number. Anything that is not an integer means the
/// first page; integers below one clamp to it and integers too large for
/// `u64` saturate, leaving the final clamp to the paginator.
pub fn page_number(query: &PageQuery) -> u64 {
    query.page.as_deref().map_or(1, parse_page)
}

fn parse_page(raw: &str) -> u64 {
    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || negative {
        return 1;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX).max(1)
}

/// Request body sent either as JSON or as an urlencoded form.
pub type FormBody<T> = web::Either<web::Json<T>, web::Form<T>>;

pub fn form_body<T>(body: FormBody<T>) -> T {
    match body {
        web::Either::Left(json) => json.into_inner(),
        web::Either::Right(form) => form.into_inner(),
    }
}

pub fn post_response(post: &Post, author: &str) -> PostResponse {
    PostResponse {
        title: post.title.clone(),
        title_slug: post.title_slug.clone(),
        url: post.url(),
        content: post.content.clone(),
        author: author.to_string(),
        created: post.created.to_rfc3339(),
        modified: post.modified.to_rfc3339(),
    }
}

fn name_of(names: &HashMap<Uuid, String>, author_id: Uuid) -> &str {
    names.get(&author_id).map_or(UNKNOWN_AUTHOR, String::as_str)
}

/// One post with its author's username.
pub async fn post_with_author(state: &AppState, post: &Post) -> AppResult<PostResponse> {
    let names = state.authors.usernames(&[post.author_id]).await?;
    Ok(post_response(post, name_of(&names, post.author_id)))
}

/// A page of posts, usernames resolved in one lookup.
pub async fn post_page(
    state: &AppState,
    page: &Page<Post>,
) -> AppResult<(Vec<PostResponse>, PageMeta)> {
    let ids: Vec<Uuid> = page.items.iter().map(|p| p.author_id).collect();
    let names = state.authors.usernames(&ids).await?;

    let posts = page
        .items
        .iter()
        .map(|p| post_response(p, name_of(&names, p.author_id)))
        .collect();

    let meta = PageMeta {
        number: page.number,
        total_pages: page.total_pages,
        total_items: page.total_items,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    };

    Ok((posts, meta))
}

pub async fn comment_responses(
    state: &AppState,
    comments: &[Comment],
) -> AppResult<Vec<CommentResponse>> {
    let ids: Vec<Uuid> = comments.iter().map(|c| c.author_id).collect();
    let names = state.authors.usernames(&ids).await?;

    Ok(comments
        .iter()
        .map(|c| CommentResponse {
            comment_text: c.comment_text.clone(),
            author: name_of(&names, c.author_id).to_string(),
            created: c.created.to_rfc3339(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_page_number_parsing() {
        assert_eq!(page_number(&query(None)), 1);
        assert_eq!(page_number(&query(Some("3"))), 3);
        assert_eq!(page_number(&query(Some("abc"))), 1);
        assert_eq!(page_number(&query(Some("0"))), 1);
        assert_eq!(page_number(&query(Some("-4"))), 1);
        assert_eq!(page_number(&query(Some(" +2 "))), 2);
        assert_eq!(page_number(&query(Some(""))), 1);
    }

    #[test]
    fn test_page_number_saturates_on_overflow() {
        assert_eq!(page_number(&query(Some("99999999999999999999"))), u64::MAX);
        assert_eq!(page_number(&query(Some("-99999999999999999999"))), 1);
        assert_eq!(page_number(&query(Some("99999999999999999999x"))), 1);
    }
}
