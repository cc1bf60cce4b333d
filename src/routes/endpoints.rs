use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::Endpoint;
use crate::state::SharedState;

fn body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(value)| value).map_err(|e| {
        tracing::debug!("Unreadable endpoint payload: {e}");
        AppError::bad_body()
    })
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = state.endpoints.create(&auth.uid, &body(payload)?).await?;
    Ok(Json(json!({ "data": { "id": id } })))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Endpoint>>, AppError> {
    let endpoints = state.endpoints.list(&auth.uid).await?;
    Ok(Json(endpoints))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = state.endpoints.update(&auth.uid, &id, &body(payload)?).await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = state.endpoints.delete(&auth.uid, &id).await?;
    Ok(Json(json!({ "id": id })))
}
