//! Mounted at `/generate` by `api_routes()`.

use axum::routing::post;
use axum::Router;

use crate::handlers::generate;
use crate::state::AppState;

/// ```text
/// POST   /                  -> generate_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(generate::generate_image))
}
