use std::sync::Arc;

use promptart_checkout::provider::CheckoutProvider;
use promptart_fulfillment::registry::SessionRegistry;
use promptart_imagegen::invoker::GenerationInvoker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Single-shot image generation backed by the shared provider client.
    pub invoker: Arc<GenerationInvoker>,
    pub checkout: Arc<dyn CheckoutProvider>,
    /// Live fulfillment sessions keyed by checkout id.
    pub sessions: Arc<SessionRegistry>,
}
