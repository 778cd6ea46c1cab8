//! Session extraction.
//!
//! A session is a JWT carried either in the `blogger_session` cookie or in
//! an `Authorization: Bearer` header. Visitors without one are redirected
//! to the login page with the current path and query in `?next=`.

use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload, web};
use std::future::{Ready, ready};

use blogger_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "blogger_session";

/// `{login_url}?next={path}` with the path URL-encoded.
pub fn login_redirect(login_url: &str, next: &str) -> String {
    format!("{}?next={}", login_url, urlencoding::encode(next))
}

/// Path of the request including its query string, if any.
pub fn full_path(req: &HttpRequest) -> &str {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path(), |pq| pq.as_str())
}

/// Authenticated user identity extractor.
///
/// ```ignore
/// async fn add_post(identity: Identity) -> impl Responder {
///     format!("Hello, {}!", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Raised when a route needs a session and none is valid.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct AuthenticationError {
    pub cause: AuthError,
    /// Login URL the visitor is sent to.
    pub location: String,
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::FOUND
    }

    fn error_response(&self) -> HttpResponse {
        tracing::debug!(reason = %self.cause, location = %self.location, "Redirecting to login");

        HttpResponse::Found()
            .insert_header((header::LOCATION, self.location.clone()))
            .finish()
    }
}

/// Session token from the Authorization header, else from the cookie.
fn session_token(req: &HttpRequest) -> Result<String, AuthError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let auth_str = value
            .to_str()
            .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;

        return auth_str
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()));
    }

    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingAuth)
}

impl FromRequest for Identity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(actix_web::error::ErrorInternalServerError(
                "Server configuration error",
            )));
        };

        let result = session_token(req)
            .and_then(|token| state.tokens.validate_token(&token))
            .map(Identity::from)
            .map_err(|cause| {
                actix_web::Error::from(AuthenticationError {
                    cause,
                    location: login_redirect(&state.settings.login_url, full_path(req)),
                })
            });

        ready(result)
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        match Identity::from_request(req, payload).into_inner() {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(_) => ready(Ok(OptionalIdentity(None))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_path() {
        assert_eq!(
            login_redirect("/accounts/login/", "/posts/add/"),
            "/accounts/login/?next=%2Fposts%2Fadd%2F"
        );
    }

    #[test]
    fn test_full_path_keeps_query() {
        let req = actix_web::test::TestRequest::get()
            .uri("/?page=2")
            .to_http_request();
        assert_eq!(full_path(&req), "/?page=2");
        assert_eq!(
            login_redirect("/accounts/login/", full_path(&req)),
            "/accounts/login/?next=%2F%3Fpage%3D2"
        );

        let req = actix_web::test::TestRequest::get()
            .uri("/posts/add/")
            .to_http_request();
        assert_eq!(full_path(&req), "/posts/add/");
    }
}
