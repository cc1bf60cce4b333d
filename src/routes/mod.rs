pub mod debug;
pub mod endpoints;
pub mod targets;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/api/debug-with-token", post(debug::with_token))
        .route(
            "/api/acceptableTargetUsernames",
            get(targets::acceptable_usernames),
        )
        .route(
            "/api/endpoints",
            get(endpoints::list).post(endpoints::create),
        )
        .route(
            "/api/endpoints/{id}",
            put(endpoints::update).delete(endpoints::delete),
        )
}
