//! Mounted at `/checkout` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

/// ```text
/// POST   /                  -> create_checkout
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(checkout::create_checkout))
}
