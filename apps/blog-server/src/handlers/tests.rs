use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use blogger_core::domain::{PostDraft, User};
use blogger_core::ports::{AuthError, PasswordService};
use blogger_infra::{JwtConfig, JwtTokenService};
use blogger_shared::dto::PostForm;

use super::configure_routes;
use crate::config::BlogSettings;
use crate::middleware::auth::SESSION_COOKIE;
use crate::state::AppState;

/// Hashing stand-in; argon2 is exercised in blogger-infra.
struct PlainPasswords;

impl PasswordService for PlainPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(hash == format!("plain:{password}"))
    }
}

fn blog_state() -> AppState {
    let tokens = JwtTokenService::new(JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 1,
        issuer: "blogger-test".to_string(),
    });
    AppState::in_memory(
        BlogSettings::default(),
        Arc::new(tokens),
        Arc::new(PlainPasswords),
    )
}

macro_rules! blog_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

/// Stores an account directly and returns a session token for it.
async fn session(state: &AppState, username: &str) -> String {
    let user = state
        .users
        .insert(User::new(username.to_string(), "plain:top_secret".to_string()))
        .await
        .unwrap();
    state.tokens.generate_token(user.id, username).unwrap()
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_anonymous_add_redirects_to_login() {
    let state = blog_state();
    let app = blog_app!(state);

    for req in [
        test::TestRequest::get().uri("/posts/add/"),
        test::TestRequest::post()
            .uri("/posts/add/")
            .set_json(json!({"title": "My Title", "content": "Body"})),
    ] {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/accounts/login/?next=%2Fposts%2Fadd%2F");
    }
}

#[actix_web::test]
async fn test_login_redirect_keeps_query_string() {
    let state = blog_state();
    let app = blog_app!(state);

    let req = test::TestRequest::get().uri("/posts/add/?draft=1").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        "/accounts/login/?next=%2Fposts%2Fadd%2F%3Fdraft%3D1"
    );
}

#[actix_web::test]
async fn test_garbage_session_redirects_to_login() {
    let state = blog_state();
    let app = blog_app!(state);

    let req = test::TestRequest::get()
        .uri("/posts/add/")
        .insert_header(bearer("not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_create_and_view_post() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "My Title", "content": "First post"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(location(&resp), "/posts/my-title/");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title_slug"], "my-title");
    assert_eq!(body["data"]["created"], body["data"]["modified"]);

    let req = test::TestRequest::get().uri("/posts/my-title/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["title"], "My Title");
    assert_eq!(body["post"]["author"], "edith");
    assert_eq!(body["can_edit"], false);
    assert_eq!(body["comments"], json!([]));

    let req = test::TestRequest::get()
        .uri("/posts/my-title/")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["can_edit"], true);
}

#[actix_web::test]
async fn test_form_post_with_session_cookie() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .cookie(Cookie::new(SESSION_COOKIE, token))
        .set_form(PostForm {
            title: "From a Form".to_string(),
            content: "Urlencoded body".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(location(&resp), "/posts/from-a-form/");
}

#[actix_web::test]
async fn test_colliding_title_is_conflict() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;

    for (title, expected) in [
        ("My Title", StatusCode::CREATED),
        ("my title!", StatusCode::CONFLICT),
    ] {
        let req = test::TestRequest::post()
            .uri("/posts/add/")
            .insert_header(bearer(&token))
            .set_json(json!({"title": title, "content": "Body"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["page"]["total_items"], 1);
}

#[actix_web::test]
async fn test_blank_fields_are_unprocessable() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "   ", "content": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["title", "content"]);
}

#[actix_web::test]
async fn test_non_owner_gets_rendered_denial() {
    let state = blog_state();
    let app = blog_app!(state);
    let owner = session(&state, "edith").await;
    let other = session(&state, "norman").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&owner))
        .set_json(json!({"title": "Mine", "content": "Hands off"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/posts/mine/edit/")
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["permitted"], false);
    assert_eq!(body["form"], Value::Null);
    assert_eq!(body["post"]["content"], "Hands off");

    let req = test::TestRequest::post()
        .uri("/posts/mine/edit/")
        .insert_header(bearer(&other))
        .set_json(json!({"title": "Stolen", "content": "Mine now"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["permitted"], false);

    let req = test::TestRequest::post()
        .uri("/posts/mine/delete/")
        .insert_header(bearer(&other))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/posts/mine/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["title"], "Mine");
    assert_eq!(body["post"]["author"], "edith");
}

#[actix_web::test]
async fn test_owner_edit_moves_slug() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "Draft", "content": "v1"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/posts/draft/edit/")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["permitted"], true);
    assert_eq!(body["form"], json!({"title": "Draft", "content": "v1"}));

    let req = test::TestRequest::post()
        .uri("/posts/draft/edit/")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "Final Cut", "content": "v2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(location(&resp), "/posts/final-cut/");

    let req = test::TestRequest::get().uri("/posts/draft/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/posts/final-cut/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["post"]["content"], "v2");
    assert_ne!(body["post"]["created"], body["post"]["modified"]);
}

#[actix_web::test]
async fn test_home_page_pagination() {
    let state = blog_state();
    let app = blog_app!(state);
    session(&state, "edith").await;

    let user = state.users.find_by_username("edith").await.unwrap().unwrap();
    let author = state.authors.resolve_or_create(user.id).await.unwrap();
    for n in 1..=11 {
        state
            .content
            .create_post(&author, PostDraft::new(format!("Post {n}"), "Body"))
            .await
            .unwrap();
    }

    let page = |query: &str| test::TestRequest::get().uri(&format!("/{query}")).to_request();

    let body: Value = test::call_and_read_body_json(&app, page("")).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 10);
    assert_eq!(body["posts"][0]["title"], "Post 11");
    assert_eq!(body["page"]["has_next"], true);

    let body: Value = test::call_and_read_body_json(&app, page("?page=2")).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert_eq!(body["posts"][0]["title"], "Post 1");

    let body: Value = test::call_and_read_body_json(&app, page("?page=3")).await;
    assert_eq!(body["page"]["number"], 2);
    assert_eq!(body["posts"][0]["title"], "Post 1");

    let body: Value = test::call_and_read_body_json(&app, page("?page=abc")).await;
    assert_eq!(body["page"]["number"], 1);

    let body: Value =
        test::call_and_read_body_json(&app, page("?page=99999999999999999999")).await;
    assert_eq!(body["page"]["number"], 2);
    assert_eq!(body["posts"][0]["title"], "Post 1");
}

#[actix_web::test]
async fn test_empty_home_page() {
    let state = blog_state();
    let app = blog_app!(state);

    let req = test::TestRequest::get().uri("/?page=5").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["posts"], json!([]));
    assert_eq!(body["page"]["number"], 1);
    assert_eq!(body["page"]["total_pages"], 1);
}

#[actix_web::test]
async fn test_comment_then_delete_post() {
    let state = blog_state();
    let app = blog_app!(state);
    let edith = session(&state, "edith").await;
    let norman = session(&state, "norman").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&edith))
        .set_json(json!({"title": "My Title", "content": "Body"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/posts/my-title/comment/")
        .insert_header(bearer(&norman))
        .set_json(json!({"comment_text": "nice!"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/posts/my-title/comment/")
        .insert_header(bearer(&norman))
        .set_json(json!({"comment_text": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::get().uri("/posts/my-title/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["author"], "norman");

    let req = test::TestRequest::post()
        .uri("/posts/my-title/delete/")
        .insert_header(bearer(&edith))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/posts/my-title/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_on_missing_post() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "norman").await;

    let req = test::TestRequest::post()
        .uri("/posts/nope/comment/")
        .insert_header(bearer(&token))
        .set_json(json!({"comment_text": "hello?"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_signup_and_login() {
    let state = blog_state();
    let app = blog_app!(state);

    let signup = |body: Value| {
        test::TestRequest::post()
            .uri("/accounts/signup/")
            .set_json(body)
            .to_request()
    };

    let resp = test::call_service(
        &app,
        signup(json!({"username": "edith123", "password1": "top_secret", "password2": "top_secret"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = test::call_service(
        &app,
        signup(json!({"username": "edith123", "password1": "top_secret", "password2": "top_secret"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(
        &app,
        signup(json!({"username": "norman", "password1": "top_secret", "password2": "top_secrets"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/accounts/login/")
        .set_json(json!({"username": "edith123", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/accounts/login/?next=%2Fposts%2Fadd%2F")
        .set_json(json!({"username": "edith123", "password": "top_secret"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie");
    assert!(cookie.http_only().unwrap_or(false));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["redirect_to"], "/posts/add/");
    assert_eq!(body["access_token"], cookie.value());

    let req = test::TestRequest::get()
        .uri("/posts/add/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_blogger_profile() {
    let state = blog_state();
    let app = blog_app!(state);
    let token = session(&state, "edith").await;
    session(&state, "norman").await;

    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&token))
        .set_json(json!({"title": "By Edith", "content": "Body"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/bloggers/edith/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["username"], "edith");
    assert_eq!(body["posts"][0]["title"], "By Edith");

    let req = test::TestRequest::get().uri("/bloggers/norman/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"], json!([]));

    let req = test::TestRequest::get().uri("/bloggers/nobody/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_account_deletion_cascades() {
    let state = blog_state();
    let app = blog_app!(state);
    let edith = session(&state, "edith").await;
    let norman = session(&state, "norman").await;

    for (token, title) in [(&edith, "Edith Writes"), (&norman, "Norman Writes")] {
        let req = test::TestRequest::post()
            .uri("/posts/add/")
            .insert_header(bearer(token))
            .set_json(json!({"title": title, "content": "Body"}))
            .to_request();
        test::call_service(&app, req).await;
    }
    let req = test::TestRequest::post()
        .uri("/posts/norman-writes/comment/")
        .insert_header(bearer(&edith))
        .set_json(json!({"comment_text": "from edith"}))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/accounts/delete/")
        .insert_header(bearer(&edith))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/posts/edith-writes/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/posts/norman-writes/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"], json!([]));

    // The old token still verifies, but the account is gone.
    let req = test::TestRequest::post()
        .uri("/posts/add/")
        .insert_header(bearer(&edith))
        .set_json(json!({"title": "Ghost", "content": "Boo"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_health() {
    let state = blog_state();
    let app = blog_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "ok");
}
