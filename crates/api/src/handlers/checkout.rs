use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use promptart_checkout::order::CheckoutOrder;
use promptart_core::prompt::Prompt;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::parse_json_body;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_id: String,
    pub checkout_url: String,
}

// ---------------------------------------------------------------------------
// POST /checkout
// ---------------------------------------------------------------------------

/// Create a hosted checkout that pays for one image of the given prompt.
pub async fn create_checkout(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let input: CheckoutRequest = parse_json_body(&body)?;
    let prompt = Prompt::parse_optional(input.prompt.as_deref())?;

    let order = CheckoutOrder::for_prompt(&prompt, &state.config.checkout)?;
    let created = state.checkout.create_checkout(&order).await?;

    tracing::info!(
        checkout_id = %created.id,
        amount = order.amount,
        currency = %order.currency,
        "Checkout created",
    );

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            checkout_id: created.id,
            checkout_url: created.checkout_url,
        }),
    ))
}
