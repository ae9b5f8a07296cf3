//! LINE webhook intake.
//!
//! Authenticates the delivery, then records every inbound text message and
//! acknowledges it with a reply. Events in one delivery are handled one
//! after another in delivery order; a failure on one event is logged and
//! never stops the rest.

use axum::{
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use relay_core::NewHistory;
use relay_line::{Event, SIGNATURE_HEADER};
use tracing::{debug, error, info, instrument, warn};

use crate::state::AppState;

/// Text sent back to the user after a message is recorded.
pub const REPLY_TEXT: &str = "message saved";

/// Receives a LINE webhook delivery.
///
/// Responds with:
/// - 400 and `{}` when the signature header is missing or does not match
/// - 500 and `{}` when a correctly signed body cannot be parsed, or when the
///   body cannot be read at all (including bodies over the size limit)
/// - 200 with an empty body once every event has been handled
#[instrument(name = "receive_webhook", skip(state, headers, body))]
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            error!(error = %rejection, "Failed to read webhook body");
            return empty_json(StatusCode::INTERNAL_SERVER_ERROR);
        },
    };

    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let events = match state.platform.parse_webhook(signature, &body) {
        Ok(events) => events,
        Err(e) if e.is_signature_error() => {
            warn!(has_signature = signature.is_some(), "Rejected webhook with invalid signature");
            return empty_json(StatusCode::BAD_REQUEST);
        },
        Err(e) => {
            error!(error = %e, "Failed to parse webhook payload");
            return empty_json(StatusCode::INTERNAL_SERVER_ERROR);
        },
    };

    info!(event_count = events.len(), body_len = body.len(), "Processing webhook events");

    for event in &events {
        handle_event(&state, event).await;
    }

    StatusCode::OK.into_response()
}

async fn handle_event(state: &AppState, event: &Event) {
    let Some(text) = event.text() else {
        debug!(event_type = ?event.kind, "Skipping event without text message");
        return;
    };

    let Some(user_id) = event.user_id() else {
        debug!("Skipping text message without sender user id");
        return;
    };

    let name = match state.platform.get_profile(user_id).await {
        Ok(profile) => profile.display_name,
        Err(e) => {
            // record is still created, with no display name
            warn!(user_id = %user_id, error = %e, "Profile lookup failed");
            String::new()
        },
    };

    match state.store.create(NewHistory::new(name, text, user_id)).await {
        Ok(record) => {
            info!(history_id = %record.id, user_id = %user_id, "Recorded inbound message");
        },
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to record inbound message");
        },
    }

    let Some(reply_token) = event.reply_token.as_deref() else {
        warn!(user_id = %user_id, "Event has no reply token, skipping reply");
        return;
    };

    if let Err(e) = state.platform.reply_text(reply_token, REPLY_TEXT).await {
        warn!(user_id = %user_id, error = %e, "Failed to send reply");
    }
}

fn empty_json(status: StatusCode) -> Response {
    (status, Json(serde_json::json!({}))).into_response()
}
