use axum::{middleware, routing::get, Router};
use std::sync::Arc;

use crate::{handlers, middleware::auth, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/availability",
            get(handlers::availability::get_availability),
        )
        .route_layer(middleware::from_fn(auth::require_identity))
}
