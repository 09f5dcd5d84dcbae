//! Route definitions for fulfillment sessions.
//!
//! Mounted at `/fulfillment` by `api_routes()`.

use axum::routing::get;
use axum::Router;

use crate::handlers::fulfillment;
use crate::state::AppState;

/// Fulfillment routes.
///
/// ```text
/// GET    /{checkout_id}     -> open_session
/// DELETE /{checkout_id}     -> abandon_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{checkout_id}",
        get(fulfillment::open_session).delete(fulfillment::abandon_session),
    )
}
