//! Route definitions for the `/proveedores` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::suppliers;
use crate::state::AppState;

/// Routes mounted at `/proveedores`.
///
/// ```text
/// GET    /                    -> list_suppliers
/// POST   /                    -> create_supplier
/// GET    /{id}                -> get_supplier
/// PUT    /{id}                -> update_supplier
/// DELETE /{id}                -> delete_supplier
/// GET    /{id}/disponibilidad -> check_availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/{id}",
            get(suppliers::get_supplier)
                .put(suppliers::update_supplier)
                .delete(suppliers::delete_supplier),
        )
        .route("/{id}/disponibilidad", get(suppliers::check_availability))
}
