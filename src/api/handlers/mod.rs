use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use triage_core::models::WebhookEvent;
use triage_core::payload::Payload;
use triage_core::Outcome;

use super::AppState;

/// Header naming the kind of delivery (`pull_request`, `issue_comment`, `ping`, ...).
const EVENT_HEADER: &str = "x-github-event";

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; the platform only needs to know
/// the delivery failed so it can be redelivered.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, String) {
    let msg = e.to_string();
    tracing::warn!("Rejected payload: {}", msg);
    (StatusCode::BAD_REQUEST, msg)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> &'static str {
    "OK"
}

// ============================================================
// Webhook
// ============================================================

pub async fn receive_payload(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let delivery = headers.get(EVENT_HEADER).and_then(|h| h.to_str().ok());
    if delivery == Some("ping") {
        return Ok((StatusCode::OK, "pong".to_string()));
    }

    if body.is_empty() {
        return Err(bad_request("Empty payload"));
    }

    let payload = Payload::from_slice(&body).map_err(bad_request)?;
    let event = WebhookEvent::from_payload(payload).map_err(bad_request)?;

    tracing::debug!(
        action = %event.kind,
        url = %event.record.url,
        actor = event.actor_name(),
        delivery,
        "Received webhook"
    );

    match state.reconciler.handle(&event).await.map_err(internal_error)? {
        Outcome::Skipped(reason) => Ok((StatusCode::OK, format!("Ignored: {}", reason))),
        Outcome::Applied { steps, .. } => {
            Ok((StatusCode::OK, format!("Applied {} change(s)", steps.len())))
        }
    }
}
