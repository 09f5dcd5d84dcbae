//! Shared helpers for API integration tests.
//!
//! The router is the production one from `build_app_router`; only the two
//! providers are replaced by in-memory fakes.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use promptart_api::config::ServerConfig;
use promptart_api::router::build_app_router;
use promptart_api::state::AppState;
use promptart_checkout::api::{CheckoutApiError, CreatedCheckout};
use promptart_checkout::config::CheckoutConfig;
use promptart_checkout::order::CheckoutOrder;
use promptart_checkout::provider::CheckoutProvider;
use promptart_core::payment::{PaymentReport, PaymentStatus};
use promptart_fulfillment::config::{FulfillmentConfig, ReentryPolicy};
use promptart_fulfillment::registry::SessionRegistry;
use promptart_fulfillment::session::FulfillmentOrchestrator;
use promptart_imagegen::api::{GenerationRequest, ImagesApiError, ImagesResponse};
use promptart_imagegen::cache::{CredentialSource, ProviderClientCache, ProviderHandle};
use promptart_imagegen::config::ImageGenConfig;
use promptart_imagegen::invoker::GenerationInvoker;
use promptart_imagegen::provider::ImageProvider;
use tower::ServiceExt;

pub const FOX_URL: &str = "https://images.example/fox.png";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

type ImageReply = Box<dyn Fn() -> Result<ImagesResponse, ImagesApiError> + Send + Sync>;

/// Image provider fake with a fixed reply, an optional delay and a call
/// counter.
pub struct FakeImages {
    reply: ImageReply,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeImages {
    pub fn new(
        reply: impl Fn() -> Result<ImagesResponse, ImagesApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn fox() -> Arc<Self> {
        Self::new(|| Ok(ImagesResponse::with_url(FOX_URL)))
    }

    /// Answers with the fox image, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(|| Ok(ImagesResponse::with_url(FOX_URL))),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for FakeImages {
    async fn generate_image(
        &self,
        _request: &GenerationRequest<'_>,
    ) -> Result<ImagesResponse, ImagesApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)()
    }
}

type CreateReply = Box<dyn Fn() -> Result<CreatedCheckout, CheckoutApiError> + Send + Sync>;

/// Checkout fake: scripted creation result and a fixed payment report.
pub struct FakeCheckout {
    create: CreateReply,
    report: PaymentReport,
    last_order: Mutex<Option<CheckoutOrder>>,
    create_calls: AtomicUsize,
}

impl FakeCheckout {
    pub fn new(
        create: impl Fn() -> Result<CreatedCheckout, CheckoutApiError> + Send + Sync + 'static,
        report: PaymentReport,
    ) -> Arc<Self> {
        Arc::new(Self {
            create: Box::new(create),
            report,
            last_order: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
        })
    }

    /// Creates `chk_1` and reports it as paid.
    pub fn paid() -> Arc<Self> {
        Self::with_report(PaymentReport::new(PaymentStatus::Paid))
    }

    pub fn with_report(report: PaymentReport) -> Arc<Self> {
        Self::new(
            || {
                Ok(CreatedCheckout {
                    id: "chk_1".into(),
                    checkout_url: "https://pay.example/chk_1".into(),
                })
            },
            report,
        )
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn last_order(&self) -> Option<CheckoutOrder> {
        self.last_order.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutProvider for FakeCheckout {
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
    ) -> Result<CreatedCheckout, CheckoutApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_order.lock().unwrap() = Some(order.clone());
        (self.create)()
    }

    async fn payment_status(&self, _checkout_id: &str) -> Result<PaymentReport, CheckoutApiError> {
        Ok(self.report.clone())
    }
}

struct FixedCredential(Option<&'static str>);

impl CredentialSource for FixedCredential {
    fn name(&self) -> &str {
        "OPENAI_API_KEY"
    }

    fn credential(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults and fast session polling.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        start_url: "/".to_string(),
        imagegen: ImageGenConfig::default(),
        checkout: CheckoutConfig::default(),
        fulfillment: FulfillmentConfig {
            poll_interval: Duration::from_millis(10),
            verify_timeout: Duration::from_secs(2),
            session_ttl: Duration::from_secs(3600),
            reentry: ReentryPolicy::Reuse,
        },
    }
}

/// Build the full application router around the given fakes.
pub fn build_test_app(images: Arc<FakeImages>, checkout: Arc<FakeCheckout>) -> Router {
    build_test_app_with_credential(images, checkout, Some("sk-test"))
}

pub fn build_test_app_with_credential(
    images: Arc<FakeImages>,
    checkout: Arc<FakeCheckout>,
    credential: Option<&'static str>,
) -> Router {
    build_test_app_with_config(images, checkout, credential, test_config())
}

pub fn build_test_app_with_config(
    images: Arc<FakeImages>,
    checkout: Arc<FakeCheckout>,
    credential: Option<&'static str>,
    config: ServerConfig,
) -> Router {
    let cache = ProviderClientCache::new(FixedCredential(credential), move |_key| {
        Arc::clone(&images) as ProviderHandle
    });
    let invoker = Arc::new(GenerationInvoker::new(Arc::new(cache), &config.imagegen));
    let checkout: Arc<dyn CheckoutProvider> = checkout;

    let orchestrator = Arc::new(FulfillmentOrchestrator::new(
        Arc::clone(&checkout),
        Arc::clone(&invoker),
        config.fulfillment.clone(),
    ));

    let state = AppState {
        config: Arc::new(config.clone()),
        invoker,
        checkout,
        sessions: Arc::new(SessionRegistry::new(orchestrator)),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty()).await
}

/// POST a raw body, which need not be valid JSON.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Body::from(body.to_string())).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    post_raw(app, uri, &json.to_string()).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
