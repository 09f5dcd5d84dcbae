use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use promptart_checkout::api::CheckoutApi;
use promptart_checkout::provider::CheckoutProvider;
use promptart_fulfillment::registry::SessionRegistry;
use promptart_fulfillment::session::FulfillmentOrchestrator;
use promptart_fulfillment::sweeper::start_session_sweeper;
use promptart_imagegen::cache::ProviderClientCache;
use promptart_imagegen::invoker::GenerationInvoker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptart_api::config::ServerConfig;
use promptart_api::router::build_app_router;
use promptart_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "promptart_api=debug,promptart_fulfillment=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // One connection pool for both providers. Each provider bounds its own
    // calls; the connect timeout covers unreachable hosts.
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    // --- Image generation ---
    // The provider client is built on first use, once OPENAI_API_KEY is present.
    let provider_cache = Arc::new(ProviderClientCache::openai(&config.imagegen, http.clone()));
    let invoker = Arc::new(GenerationInvoker::new(provider_cache, &config.imagegen));
    tracing::info!(
        model = %config.imagegen.model,
        size = %config.imagegen.size,
        timeout_secs = config.imagegen.timeout.as_secs(),
        "Image generation configured"
    );

    // --- Checkout ---
    let checkout: Arc<dyn CheckoutProvider> = Arc::new(
        CheckoutApi::with_client(
            http,
            config.checkout.api_url.clone(),
            config.checkout.access_token.clone(),
        )
        .with_timeout(config.checkout.timeout),
    );
    tracing::info!(
        api_url = %config.checkout.api_url,
        timeout_secs = config.checkout.timeout.as_secs(),
        "Checkout provider configured"
    );

    // --- Fulfillment ---
    let orchestrator = Arc::new(FulfillmentOrchestrator::new(
        Arc::clone(&checkout),
        Arc::clone(&invoker),
        config.fulfillment.clone(),
    ));
    let sessions = Arc::new(SessionRegistry::new(orchestrator));
    let sweeper_handle =
        start_session_sweeper(Arc::clone(&sessions), config.fulfillment.session_ttl);
    tracing::info!(
        reentry = ?config.fulfillment.reentry,
        ttl_secs = config.fulfillment.session_ttl.as_secs(),
        "Fulfillment sessions enabled"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        invoker,
        checkout,
        sessions: Arc::clone(&sessions),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_handle.abort();
    let remaining = sessions.session_count().await;
    tracing::info!(remaining, "Session sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
