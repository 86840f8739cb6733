//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /register     -> register   (public)
/// POST   /login        -> login      (public)
/// GET    /user         -> get_user
/// PUT    /user         -> update_user
/// POST   /logout       -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/user", get(auth::get_user).put(auth::update_user))
        .route("/logout", post(auth::logout))
}
