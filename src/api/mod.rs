mod handlers;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use triage_core::Reconciler;

use crate::config::WebhookSecret;

/// Shared per-process state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Reconciler,
    pub secret: WebhookSecret,
}

impl AppState {
    pub fn new(reconciler: Reconciler, secret: WebhookSecret) -> Self {
        Self { reconciler, secret }
    }
}

pub fn create_router(state: AppState) -> Router {
    let webhook = Router::new()
        .route("/payload", post(handlers::receive_payload))
        .route_layer(axum::middleware::from_fn_with_state(
            state.secret.clone(),
            middleware::signature_middleware,
        ))
        .layer(DefaultBodyLimit::max(middleware::MAX_PAYLOAD_BYTES));

    Router::new()
        // Health
        .route("/", get(handlers::health))
        .merge(webhook)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
