//! Post and comment handlers.

use actix_web::{HttpRequest, HttpResponse, http::header, web};

use blogger_core::DomainError;
use blogger_core::authz;
use blogger_core::domain::{Author, PageRequest, Post, PostDraft};
use blogger_shared::ApiResponse;
use blogger_shared::dto::{
    CommentForm, CommentResponse, FormView, PageQuery, PostDetailResponse, PostForm,
    PostListResponse,
};

use super::render::{
    FormBody, comment_responses, form_body, page_number, post_page, post_response,
    post_with_author,
};
use crate::middleware::auth::{Identity, OptionalIdentity, full_path, login_redirect};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const EDIT_DENIED: &str = "You are not permitted to edit this post.";
const DELETE_DENIED: &str = "You are not permitted to delete this post.";

/// The author behind a session, created on first use.
///
/// A session that outlived its account is sent back to login.
pub(super) async fn acting_author(
    state: &AppState,
    identity: &Identity,
    req: &HttpRequest,
) -> AppResult<Author> {
    if state.users.find_by_id(identity.user_id).await?.is_none() {
        tracing::warn!(user_id = %identity.user_id, "Session for a deleted account");
        return Err(AppError::LoginRequired(login_redirect(
            &state.settings.login_url,
            full_path(req),
        )));
    }

    Ok(state.authors.resolve_or_create(identity.user_id).await?)
}

/// Author of the viewer, if the viewer is signed in and has written anything.
async fn viewing_author(
    state: &AppState,
    identity: &OptionalIdentity,
) -> AppResult<Option<Author>> {
    match &identity.0 {
        Some(identity) => Ok(state.authors.find(identity.user_id).await?),
        None => Ok(None),
    }
}

fn denied(post: &Post, author: &str, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(FormView::<PostForm>::denied(post_response(post, author), message))
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = PageRequest::new(page_number(&query), state.settings.posts_per_page);
    let page = state.content.list_posts(request).await?;
    let (posts, page) = post_page(&state, &page).await?;

    Ok(HttpResponse::Ok().json(PostListResponse { posts, page }))
}

/// GET /posts/add/
pub async fn add_form(_identity: Identity) -> HttpResponse {
    HttpResponse::Ok().json(FormView::open(None, PostForm::default()))
}

/// POST /posts/add/
pub async fn add(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    body: FormBody<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form_body(body);
    let author = acting_author(&state, &identity, &req).await?;

    let post = state
        .content
        .create_post(&author, PostDraft::new(form.title, form.content))
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post.url()))
        .json(ApiResponse::ok(post_response(&post, &identity.username))))
}

/// GET /posts/{slug}/
pub async fn view(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post(&path).await?;
    let comments = state.content.list_comments(&post).await?;

    let can_edit = viewing_author(&state, &identity)
        .await?
        .is_some_and(|viewer| authz::can_mutate(&viewer, &post));

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_with_author(&state, &post).await?,
        comments: comment_responses(&state, &comments).await?,
        can_edit,
    }))
}

/// GET /posts/{slug}/edit/
pub async fn edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post(&path).await?;
    let actor = acting_author(&state, &identity, &req).await?;
    let view = post_with_author(&state, &post).await?;

    if !authz::can_mutate(&actor, &post) {
        return Ok(HttpResponse::Ok().json(FormView::<PostForm>::denied(view, EDIT_DENIED)));
    }

    let form = PostForm {
        title: post.title.clone(),
        content: post.content.clone(),
    };
    Ok(HttpResponse::Ok().json(FormView::open(Some(view), form)))
}

/// POST /posts/{slug}/edit/
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
    body: FormBody<PostForm>,
) -> AppResult<HttpResponse> {
    let form = form_body(body);
    let post = state.content.get_post(&path).await?;
    let actor = acting_author(&state, &identity, &req).await?;
    let snapshot = post.clone();

    match state
        .content
        .update_post(&actor, post, PostDraft::new(form.title, form.content))
        .await
    {
        Ok(updated) => Ok(HttpResponse::Ok()
            .insert_header((header::LOCATION, updated.url()))
            .json(ApiResponse::ok(post_response(&updated, &identity.username)))),
        Err(DomainError::PermissionDenied) => {
            let owner = post_with_author(&state, &snapshot).await?.author;
            Ok(denied(&snapshot, &owner, EDIT_DENIED))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{slug}/delete/
pub async fn delete_form(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post(&path).await?;
    let actor = acting_author(&state, &identity, &req).await?;
    let view = post_with_author(&state, &post).await?;

    if !authz::can_mutate(&actor, &post) {
        return Ok(HttpResponse::Ok().json(FormView::<()>::denied(view, DELETE_DENIED)));
    }

    Ok(HttpResponse::Ok().json(FormView::open(Some(view), ())))
}

/// POST /posts/{slug}/delete/
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post(&path).await?;
    let actor = acting_author(&state, &identity, &req).await?;

    match state.content.delete_post(&actor, &post).await {
        Ok(()) => Ok(HttpResponse::Ok()
            .insert_header((header::LOCATION, "/"))
            .json(ApiResponse::done("Post deleted"))),
        Err(DomainError::PermissionDenied) => {
            let owner = post_with_author(&state, &post).await?.author;
            Ok(denied(&post, &owner, DELETE_DENIED))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /posts/{slug}/comment/
pub async fn comment_form(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state.content.get_post(&path).await?;
    let view = post_with_author(&state, &post).await?;

    Ok(HttpResponse::Ok().json(FormView::open(Some(view), CommentForm::default())))
}

/// POST /posts/{slug}/comment/
pub async fn comment(
    state: web::Data<AppState>,
    identity: Identity,
    req: HttpRequest,
    path: web::Path<String>,
    body: FormBody<CommentForm>,
) -> AppResult<HttpResponse> {
    let form = form_body(body);
    let post = state.content.get_post(&path).await?;
    let author = acting_author(&state, &identity, &req).await?;

    let saved = state
        .content
        .add_comment(&post, &author, &form.comment_text)
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, post.url()))
        .json(ApiResponse::ok(CommentResponse {
            comment_text: saved.comment_text,
            author: identity.username,
            created: saved.created.to_rfc3339(),
        })))
}
