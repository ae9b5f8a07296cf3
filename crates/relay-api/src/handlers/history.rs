//! History listing by display name.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use crate::state::AppState;

/// Query string of `GET /history`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Display name to match exactly.
    #[serde(default)]
    pub name: String,
}

/// Lists every record stored under a display name, oldest first.
///
/// The body is a JSON array served as `text/plain`. Lookup failures are
/// logged and answered with an empty array; the status is always 200.
#[instrument(name = "query_history", skip(state, query))]
pub async fn query_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Response {
    let name = query.map(|Query(q)| q.name).unwrap_or_default();

    let records = match state.store.find_all_by_name(&name).await {
        Ok(records) => records,
        Err(e) => {
            error!(name = %name, error = %e, "History lookup failed");
            Vec::new()
        },
    };

    debug!(name = %name, count = records.len(), "Serving history");

    let body = serde_json::to_vec(&records).unwrap_or_else(|e| {
        error!(error = %e, "Failed to serialize history");
        b"[]".to_vec()
    });

    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}
