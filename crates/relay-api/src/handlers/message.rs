//! Outbound message push addressed by display name.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::state::AppState;

/// Form body of `POST /message`, URL-encoded or multipart.
#[derive(Debug, Default, Deserialize)]
pub struct SendMessageForm {
    /// Display name to look up.
    #[serde(default)]
    pub name: String,
    /// Text to push.
    #[serde(default)]
    pub msg: String,
}

/// Outcome reported in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SendStatus {
    /// The history lookup failed.
    #[serde(rename = "db error")]
    DbError,
    /// No record exists for the name.
    #[serde(rename = "uid not found")]
    UidNotFound,
    /// The platform rejected or failed the push.
    #[serde(rename = "send message failed")]
    SendFailed,
    /// The push was accepted.
    #[serde(rename = "message sent")]
    Sent,
}

/// Response body of `POST /message`.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    /// Outcome of the request.
    pub status: SendStatus,
}

/// Pushes `msg` to the user most recently recorded under `name`.
///
/// Always answers 200; the outcome is carried in the body's `status` field.
/// A missing or unreadable form is treated as empty fields.
#[instrument(name = "send_message", skip(state, request))]
pub async fn send_message(
    State(state): State<AppState>,
    request: Request,
) -> Json<SendMessageResponse> {
    let form = read_form(request).await;

    let status = push_to_name(&state, &form.name, &form.msg).await;
    Json(SendMessageResponse { status })
}

async fn read_form(request: Request) -> SendMessageForm {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        return match Multipart::from_request(request, &()).await {
            Ok(multipart) => read_multipart(multipart).await,
            Err(rejection) => {
                debug!(error = %rejection, "Unreadable multipart form, treating fields as empty");
                SendMessageForm::default()
            },
        };
    }

    match Form::<SendMessageForm>::from_request(request, &()).await {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!(error = %rejection, "Unreadable form, treating fields as empty");
            SendMessageForm::default()
        },
    }
}

/// Reads the first `name` and `msg` fields; other fields are skipped.
async fn read_multipart(mut multipart: Multipart) -> SendMessageForm {
    let mut form = SendMessageForm::default();
    let (mut seen_name, mut seen_msg) = (false, false);

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Malformed multipart body, keeping fields read so far");
                break;
            },
        };

        let slot = match field.name() {
            Some("name") if !seen_name => {
                seen_name = true;
                &mut form.name
            },
            Some("msg") if !seen_msg => {
                seen_msg = true;
                &mut form.msg
            },
            _ => continue,
        };

        match field.text().await {
            Ok(text) => *slot = text,
            Err(e) => {
                debug!(error = %e, "Unreadable multipart field, keeping fields read so far");
                break;
            },
        }
    }

    form
}

async fn push_to_name(state: &AppState, name: &str, msg: &str) -> SendStatus {
    let record = match state.store.find_one_by_name(name).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            info!(name = %name, "No history for name, nothing to push");
            return SendStatus::UidNotFound;
        },
        Err(e) => {
            error!(name = %name, error = %e, "History lookup failed");
            return SendStatus::DbError;
        },
    };

    match state.platform.push_text(&record.uid, msg).await {
        Ok(()) => {
            info!(name = %name, history_id = %record.id, "Message pushed");
            SendStatus::Sent
        },
        Err(e) => {
            warn!(name = %name, uid = %record.uid, error = %e, "Push failed");
            SendStatus::SendFailed
        },
    }
}
