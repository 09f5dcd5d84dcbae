//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no router needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use promptart_api::error::AppError;
use promptart_checkout::api::CheckoutApiError;
use promptart_core::error::CoreError;
use promptart_core::image::GenerationFailure;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Fulfillment session",
        id: "chk_42".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Fulfillment session with id chk_42 not found");
}

// ---------------------------------------------------------------------------
// Test: validation errors map to 400 and keep their message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Prompt is required.".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Prompt is required.");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("Invalid JSON payload.".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Invalid JSON payload.");
}

// ---------------------------------------------------------------------------
// Test: configuration failures are 500s with a generic message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn configuration_error_returns_500_and_hides_detail() {
    let err = AppError::from(CoreError::from(GenerationFailure::configuration(
        "OPENAI_API_KEY is not configured.",
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert!(!json["error"].as_str().unwrap().contains("OPENAI_API_KEY"));
}

// ---------------------------------------------------------------------------
// Test: provider failures are 502s that keep the provider message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_error_returns_502_with_message() {
    let err = AppError::from(CoreError::from(GenerationFailure::provider(
        "The image API did not return a URL.",
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "PROVIDER_ERROR");
    assert_eq!(json["error"], "The image API did not return a URL.");
}

#[tokio::test]
async fn checkout_rejection_becomes_provider_error() {
    let err = AppError::from(CheckoutApiError::Rejected {
        status: 401,
        message: "Invalid access token".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Invalid access token");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Conflict maps to 409 with CONFLICT code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict("session already finished".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "session already finished");
}

// ---------------------------------------------------------------------------
// Test: internal errors map to 500 and sanitize the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_errors_return_500_and_sanitize_message() {
    for err in [
        AppError::InternalError("secret provider token leaked".into()),
        AppError::Core(CoreError::Internal("verifying session has no prompt".into())),
    ] {
        let (status, json) = error_to_response(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"], "An internal error occurred");
    }
}
