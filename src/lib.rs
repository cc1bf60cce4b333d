pub mod config;
pub mod error;
pub mod state;
pub mod auth;
pub mod db;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::auth::verifier::TokenVerifier;
use crate::config::Config;
use crate::service::EndpointService;
use crate::state::{AppState, SharedState};
use crate::store::EndpointStore;
use crate::validation::AllowList;

pub fn build_app(
    config: Config,
    store: Arc<dyn EndpointStore>,
    verifier: Arc<dyn TokenVerifier>,
) -> Router {
    let endpoints = EndpointService::new(
        store,
        AllowList::new(config.targets.clone()),
        config.store_timeout,
    );
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        config,
        verifier,
        endpoints,
    });

    // `owner` is filled in once the caller is authenticated
    let trace = TraceLayer::new_for_http().make_span_with(|req: &Request| {
        tracing::info_span!(
            "request",
            method = %req.method(),
            uri = %req.uri(),
            owner = tracing::field::Empty,
        )
    });

    Router::new()
        .merge(routes::api_routes())
        .route("/", axum::routing::get(root))
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(trace)
        .with_state(state)
}

async fn root() -> &'static str {
    "Hello from notifier"
}

async fn health() -> &'static str {
    "ok"
}
