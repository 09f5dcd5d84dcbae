//! Handler for direct image generation.
//!
//! Stateless: every call validates the prompt and performs one fresh
//! generation. Nothing is cached by prompt.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use promptart_core::error::CoreError;
use promptart_core::prompt::Prompt;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::parse_json_body;
use crate::state::AppState;

/// Shown alongside every preview generated without a payment.
pub const PREVIEW_NOTE: &str =
    "Replace this step with your payment processor before revealing the art.";

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    pub prompt: String,
    pub note: &'static str,
}

// ---------------------------------------------------------------------------
// POST /generate
// ---------------------------------------------------------------------------

/// Generate one image for the submitted prompt.
pub async fn generate_image(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<GenerateResponse>> {
    let input: GenerateRequest = parse_json_body(&body)?;
    let prompt = Prompt::parse_optional(input.prompt.as_deref())?;

    let image = state
        .invoker
        .generate(&prompt)
        .await
        .map_err(CoreError::from)?;

    Ok(Json(GenerateResponse {
        image_url: image.into_inner(),
        prompt: prompt.into_inner(),
        note: PREVIEW_NOTE,
    }))
}
