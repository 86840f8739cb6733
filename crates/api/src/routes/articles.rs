//! Route definitions for the `/articulos` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Routes mounted at `/articulos`.
///
/// Updates use `POST` because they carry multipart uploads.
///
/// ```text
/// GET    /             -> list_articles
/// POST   /             -> create_article  (multipart)
/// GET    /{id}         -> get_article
/// POST   /{id}         -> update_article  (multipart)
/// DELETE /{id}         -> delete_article
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/{id}",
            get(articles::get_article)
                .post(articles::update_article)
                .delete(articles::delete_article),
        )
}
