pub mod articles;
pub mod auth;
pub mod health;
pub mod suppliers;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /auth/register                           register (public)
/// /auth/login                              login (public)
/// /auth/user                               get, update current user
/// /auth/logout                             revoke the presented token
///
/// /articulos                               list, create (multipart)
/// /articulos/{id}                          get, update (multipart POST), delete
///
/// /proveedores                             list, create
/// /proveedores/{id}                        get, update, delete
/// /proveedores/{id}/disponibilidad         availability check (?dia=&hora=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/articulos", articles::router())
        .nest("/proveedores", suppliers::router())
}
