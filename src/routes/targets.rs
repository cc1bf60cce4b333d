use axum::Json;
use axum::extract::State;

use crate::state::SharedState;

/// The configured allow-list, in configuration order.
pub async fn acceptable_usernames(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.endpoints.allow_list().usernames().to_vec())
}
