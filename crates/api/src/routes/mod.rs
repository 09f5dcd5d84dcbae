pub mod checkout;
pub mod fulfillment;
pub mod generate;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /generate                        generate an image for a prompt (POST)
///
/// /checkout                        create a checkout for a prompt (POST)
///
/// /fulfillment/{checkout_id}       open or read a session (GET), abandon (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/generate", generate::router())
        .nest("/checkout", checkout::router())
        .nest("/fulfillment", fulfillment::router())
}
