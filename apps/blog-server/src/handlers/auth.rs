//! Account handlers: signup, login, logout and account deletion.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};

use blogger_core::domain::{User, validate_username};
use blogger_core::error::{DomainError, FieldError, RepoError};
use blogger_core::ports::AuthError;
use blogger_shared::ApiResponse;
use blogger_shared::dto::{AuthResponse, LoginRequest, NextQuery, SignupRequest, UserResponse};

use super::render::{FormBody, form_body};
use crate::middleware::auth::{Identity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const PASSWORD_MIN_CHARS: usize = 8;
const USERNAME_TAKEN: &str = "A user with that username already exists.";

fn validate_signup(req: &SignupRequest) -> Result<(), DomainError> {
    let mut errors = match validate_username(&req.username) {
        Ok(()) => Vec::new(),
        Err(DomainError::Validation(errors)) => errors,
        Err(other) => return Err(other),
    };

    if req.password1.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(FieldError::new(
            "password1",
            format!("This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."),
        ));
    }
    if req.password1 != req.password2 {
        errors.push(FieldError::new(
            "password2",
            "The two password fields didn't match.",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

/// `next` if it is a local path, else the home page.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => "/".to_string(),
    }
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(state.settings.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(state.tokens.expiration_seconds()))
        .finish()
}

fn cleared_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// POST /accounts/signup/
pub async fn signup(
    state: web::Data<AppState>,
    body: FormBody<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = form_body(body);
    validate_signup(&req)?;

    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::Conflict(USERNAME_TAKEN.to_string()));
    }

    let password_hash = state.passwords.hash(&req.password1)?;

    let user = state
        .users
        .insert(User::new(req.username, password_hash))
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::Conflict(USERNAME_TAKEN.to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "Account created");

    Ok(HttpResponse::Created().json(UserResponse {
        id: user.id.to_string(),
        username: user.username,
        created_at: user.created_at.to_rfc3339(),
    }))
}

/// POST /accounts/login/?next=
pub async fn login(
    state: web::Data<AppState>,
    query: web::Query<NextQuery>,
    body: FormBody<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = form_body(body);

    let user = state
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::warn!(username = %req.username, "Failed login");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.generate_token(user.id, &user.username)?;
    tracing::info!(user_id = %user.id, "Logged in");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state, token.clone()))
        .json(AuthResponse {
            access_token: token,
            token_type: "Bearer".to_string(),
            expires_in: state.tokens.expiration_seconds().max(0) as u64,
            redirect_to: safe_next(query.next.as_deref()),
        }))
}

/// POST /accounts/logout/
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(cleared_cookie())
        .json(ApiResponse::done("Logged out"))
}

/// POST /accounts/delete/
///
/// Removes the account with its author, posts and every related comment.
pub async fn delete_account(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    state
        .users
        .delete_cascade(identity.user_id)
        .await
        .map_err(|e| match e {
            RepoError::NotFound => AppError::NotFound("Account not found".to_string()),
            other => other.into(),
        })?;

    tracing::info!(user_id = %identity.user_id, "Account deleted");

    Ok(HttpResponse::Ok()
        .cookie(cleared_cookie())
        .json(ApiResponse::done("Account deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, password1: &str, password2: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_signup_collects_every_field_error() {
        let err = validate_signup(&signup("bad name", "short", "other")).unwrap_err();

        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["username", "password1", "password2"]);
    }

    #[test]
    fn test_valid_signup() {
        assert!(validate_signup(&signup("edith123", "top_secret", "top_secret")).is_ok());
    }

    #[test]
    fn test_next_must_be_local() {
        assert_eq!(safe_next(Some("/posts/add/")), "/posts/add/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
