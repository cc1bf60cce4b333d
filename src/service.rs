use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Endpoint;
use crate::store::{EndpointStore, StoreError};
use crate::validation::{AllowList, EndpointRequest, validate_request};

/// Endpoint CRUD for an already authenticated owner: validate the payload,
/// then hit the store under a timeout.
pub struct EndpointService {
    store: Arc<dyn EndpointStore>,
    allow_list: AllowList,
    timeout: Duration,
}

impl EndpointService {
    pub fn new(store: Arc<dyn EndpointStore>, allow_list: AllowList, timeout: Duration) -> Self {
        Self {
            store,
            allow_list,
            timeout,
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn validate(&self, body: &Value) -> Result<EndpointRequest, AppError> {
        validate_request(body, &self.allow_list).map_err(|reason| {
            tracing::debug!("Rejected endpoint payload: {reason}");
            AppError::bad_body()
        })
    }

    pub async fn create(&self, owner: &str, body: &Value) -> Result<Uuid, AppError> {
        let req = self.validate(body)?;
        let now = Utc::now();

        tracing::info!(
            "Add endpoint / {owner} {} {} {}",
            req.label,
            req.destination.kind(),
            req.destination.details()
        );

        self.guarded(
            || format!("Failed to add endpoint. / owner {owner}"),
            self.store.create(owner, &req, now),
        )
        .await
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Endpoint>, AppError> {
        tracing::info!("Get endpoints / {owner}");

        self.guarded(
            || format!("Failed to get endpoints of {owner}."),
            self.store.list_by_owner(owner),
        )
        .await
    }

    /// Replace an owned endpoint. A path id that is not a UUID is a bad
    /// request.
    pub async fn update(&self, owner: &str, id: &str, body: &Value) -> Result<Uuid, AppError> {
        let id = Uuid::parse_str(id).map_err(|_| AppError::bad_body())?;
        let req = self.validate(body)?;
        let now = Utc::now();

        tracing::info!("Update endpoint {id} / {owner}");

        self.guarded(
            || format!("Failed to update endpoint {id}. / owner {owner}"),
            self.store.update_by_owner(id, owner, &req, now),
        )
        .await?
        .map(|endpoint| endpoint.id)
        .ok_or_else(AppError::endpoint_not_found)
    }

    /// Delete an owned endpoint. A path id that is not a UUID cannot name
    /// an endpoint, so it reports not found.
    pub async fn delete(&self, owner: &str, id: &str) -> Result<Uuid, AppError> {
        let id = Uuid::parse_str(id).map_err(|_| AppError::endpoint_not_found())?;

        tracing::info!("Delete endpoint {id} / {owner}");

        self.guarded(
            || format!("Failed to delete endpoint {id}. / owner {owner}"),
            self.store.delete_by_owner(id, owner),
        )
        .await?
        .map(|endpoint| endpoint.id)
        .ok_or_else(AppError::endpoint_not_found)
    }

    async fn guarded<T, F, C>(&self, context: C, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, StoreError>>,
        C: Fn() -> String,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::Internal(format!("{} {e}", context()))),
            Err(_) => Err(AppError::Timeout(context())),
        }
    }
}
