use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the rentals REST surface onto `router`.
///
/// Literal segments (`/users/me`, `/flats/my`, ...) take precedence over the
/// `{id}` captures next to them.
pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let router = router
        // accounts
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/users/forgotPassword", post(handlers::forgot_password))
        .route("/users/resetPassword/{token}", patch(handlers::reset_password))
        .route("/users/updatePassword", patch(handlers::update_password))
        .route("/users/me", get(handlers::me))
        .route("/users/allUsers", get(handlers::list_users))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // favorites
        .route("/users/favorites", get(handlers::list_favorites))
        .route(
            "/users/favorites/{flat_id}",
            post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        // flats
        .route(
            "/flats",
            get(handlers::list_flats).post(handlers::create_flat),
        )
        .route("/flats/my", get(handlers::my_flats))
        .route(
            "/flats/{id}",
            get(handlers::get_flat)
                .patch(handlers::update_flat)
                .delete(handlers::delete_flat),
        )
        // messages
        .route(
            "/flats/{id}/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .layer(Extension(service));

    tracing::debug!("rentals routes registered");
    Ok(router)
}
