pub mod checkout;
pub mod fulfillment;
pub mod generate;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{AppError, INVALID_JSON_PAYLOAD};

/// Decode a JSON request body.
///
/// Bodies are taken as raw bytes so that malformed JSON yields the same
/// `{ error, code }` envelope as every other failure.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        AppError::BadRequest(INVALID_JSON_PAYLOAD.to_string())
    })
}
