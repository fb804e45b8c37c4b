//! HTTP handlers and route configuration.

mod access;
mod admin;
mod auth;
mod editor;
mod health;
mod mapping;
mod media;
mod posts;
mod taxonomy;

use actix_web::web;
use folio_core::domain::MAX_IMAGE_BYTES;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/health/ready", web::get().to(health::readiness))
            .route("/posts", web::get().to(posts::list))
            .route("/posts/{slug}", web::get().to(posts::get_by_slug))
            .route("/posts/{slug}/related", web::get().to(posts::related))
            .route("/categories", web::get().to(taxonomy::list_categories))
            .route("/categories/{slug}", web::get().to(taxonomy::category_posts))
            .route("/authors", web::get().to(taxonomy::list_authors))
            .route("/routes/access", web::get().to(access::route_access))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::sign_up))
                    .route("/signin", web::post().to(auth::sign_in))
                    .route("/signout", web::post().to(auth::sign_out))
                    .route("/refresh", web::post().to(auth::refresh))
                    .route("/session", web::get().to(auth::current_session))
                    .route("/profile", web::put().to(auth::update_profile)),
            )
            // Editor routes
            .service(
                web::scope("/editor")
                    .route("/stats", web::get().to(editor::stats))
                    .route("/posts", web::get().to(editor::list_posts))
                    .route("/posts", web::post().to(editor::create_post))
                    .route("/posts/{id}", web::get().to(editor::get_post))
                    .route("/posts/{id}", web::put().to(editor::update_post))
                    .route("/posts/{id}", web::delete().to(editor::delete_post))
                    .route("/posts/{id}/publish", web::post().to(editor::publish_post))
                    .route("/posts/{id}/unpublish", web::post().to(editor::unpublish_post))
                    .route("/categories", web::post().to(editor::create_category))
                    .route("/categories/{id}", web::put().to(editor::update_category))
                    .route("/categories/{id}", web::delete().to(editor::delete_category))
                    // Oversized images must reach validation to get a friendly error.
                    .service(
                        web::resource("/images")
                            .app_data(web::PayloadConfig::new(MAX_IMAGE_BYTES * 2))
                            .route(web::post().to(editor::upload_image)),
                    ),
            )
            // Admin routes
            .service(
                web::scope("/admin")
                    .route("/users", web::get().to(admin::list_users))
                    .route("/users/{id}/roles", web::post().to(admin::add_role))
                    .route("/users/{id}/roles/{role}", web::delete().to(admin::remove_role))
                    .route("/users/{id}/profile", web::put().to(admin::update_user_profile))
                    .route("/authors", web::post().to(admin::create_author))
                    .route("/authors/{id}", web::put().to(admin::update_author))
                    .route("/authors/{id}", web::delete().to(admin::delete_author)),
            ),
    )
    .route("/media/{path:.*}", web::get().to(media::serve));
}
