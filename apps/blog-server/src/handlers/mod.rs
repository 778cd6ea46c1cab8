//! HTTP handlers and route configuration.

mod auth;
mod bloggers;
mod health;
mod posts;
mod render;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/posts")
                .route("/add/", web::get().to(posts::add_form))
                .route("/add/", web::post().to(posts::add))
                .route("/{slug}/", web::get().to(posts::view))
                .route("/{slug}/edit/", web::get().to(posts::edit_form))
                .route("/{slug}/edit/", web::post().to(posts::edit))
                .route("/{slug}/delete/", web::get().to(posts::delete_form))
                .route("/{slug}/delete/", web::post().to(posts::delete))
                .route("/{slug}/comment/", web::get().to(posts::comment_form))
                .route("/{slug}/comment/", web::post().to(posts::comment)),
        )
        .route("/bloggers/{username}/", web::get().to(bloggers::profile))
        .service(
            web::scope("/accounts")
                .route("/signup/", web::post().to(auth::signup))
                .route("/login/", web::post().to(auth::login))
                .route("/logout/", web::post().to(auth::logout))
                .route("/delete/", web::post().to(auth::delete_account)),
        );
}
