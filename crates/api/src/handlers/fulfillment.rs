//! Handlers for fulfillment sessions.
//!
//! A buyer returning from checkout opens the session for their checkout id;
//! clients then re-issue the same `GET` to follow its progress.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use promptart_core::error::CoreError;
use promptart_core::payment::validate_checkout_id;
use promptart_fulfillment::registry::OpenSession;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FulfillmentQuery {
    pub prompt: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /fulfillment/{checkout_id}
// ---------------------------------------------------------------------------

/// Open (or look up) the session for a checkout and return its snapshot.
///
/// Responds `303 See Other` to the start page when no usable prompt is known.
pub async fn open_session(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
    Query(query): Query<FulfillmentQuery>,
) -> AppResult<Response> {
    validate_checkout_id(&checkout_id)?;

    match state.sessions.open(&checkout_id, query.prompt.as_deref()).await {
        OpenSession::Opened(snapshot) => Ok(Json(snapshot).into_response()),
        OpenSession::RedirectToStart => Ok(Redirect::to(&state.config.start_url).into_response()),
    }
}

// ---------------------------------------------------------------------------
// DELETE /fulfillment/{checkout_id}
// ---------------------------------------------------------------------------

pub async fn abandon_session(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> AppResult<StatusCode> {
    validate_checkout_id(&checkout_id)?;

    if !state.sessions.abandon(&checkout_id).await {
        return Err(CoreError::NotFound {
            entity: "Fulfillment session",
            id: checkout_id,
        }
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
