//! Shared fakes for fulfillment integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use promptart_checkout::api::{CheckoutApiError, CreatedCheckout};
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

pub const FOX_URL: &str = "https://images.example/fox.png";

/// Upper bound for any single test to reach a terminal state.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// One scripted answer of the payment-status query.
#[derive(Debug, Clone)]
pub enum Step {
    Report(PaymentReport),
    Unreachable,
}

pub fn status(status: PaymentStatus) -> Step {
    Step::Report(PaymentReport::new(status))
}

/// Checkout fake that replays a script of status answers. The last answer
/// repeats once the script runs out.
pub struct ScriptedCheckout {
    steps: Mutex<VecDeque<Step>>,
    delays: Mutex<HashMap<String, Duration>>,
    status_calls: AtomicUsize,
}

impl ScriptedCheckout {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into_iter().collect()),
            delays: Mutex::new(HashMap::new()),
            status_calls: AtomicUsize::new(0),
        })
    }

    /// Make every status query for `checkout_id` take `delay` first.
    pub fn stall(&self, checkout_id: &str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(checkout_id.to_string(), delay);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap_or(Step::Unreachable)
        }
    }
}

#[async_trait]
impl CheckoutProvider for ScriptedCheckout {
    async fn create_checkout(
        &self,
        _order: &CheckoutOrder,
    ) -> Result<CreatedCheckout, CheckoutApiError> {
        Ok(CreatedCheckout {
            id: "chk_test".into(),
            checkout_url: "https://pay.example/chk_test".into(),
        })
    }

    async fn payment_status(&self, checkout_id: &str) -> Result<PaymentReport, CheckoutApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(checkout_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_step() {
            Step::Report(report) => Ok(report),
            Step::Unreachable => Err(CheckoutApiError::Rejected {
                status: 503,
                message: "checkout provider unavailable".into(),
            }),
        }
    }
}

type Reply = Box<dyn Fn() -> Result<ImagesResponse, ImagesApiError> + Send + Sync>;

/// Image provider fake with a fixed reply, an optional delay and a call
/// counter.
pub struct CountingImages {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CountingImages {
    pub fn new(
        reply: impl Fn() -> Result<ImagesResponse, ImagesApiError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
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
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for CountingImages {
    async fn generate_image(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<ImagesResponse, ImagesApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.reply)()
    }
}

pub struct FixedCredential(pub Option<&'static str>);

impl CredentialSource for FixedCredential {
    fn name(&self) -> &str {
        "OPENAI_API_KEY"
    }

    fn credential(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}

pub fn test_config() -> FulfillmentConfig {
    FulfillmentConfig {
        poll_interval: Duration::from_millis(10),
        verify_timeout: Duration::from_secs(2),
        session_ttl: Duration::from_secs(3600),
        reentry: ReentryPolicy::Reuse,
    }
}

pub fn invoker(images: Arc<CountingImages>, credential: Option<&'static str>) -> GenerationInvoker {
    invoker_with_config(images, credential, &ImageGenConfig::default())
}

pub fn invoker_with_config(
    images: Arc<CountingImages>,
    credential: Option<&'static str>,
    config: &ImageGenConfig,
) -> GenerationInvoker {
    let cache = ProviderClientCache::new(FixedCredential(credential), move |_key| {
        Arc::clone(&images) as ProviderHandle
    });
    GenerationInvoker::new(Arc::new(cache), config)
}

pub fn orchestrator(
    checkout: Arc<ScriptedCheckout>,
    images: Arc<CountingImages>,
    config: FulfillmentConfig,
) -> FulfillmentOrchestrator {
    FulfillmentOrchestrator::new(
        checkout,
        Arc::new(invoker(images, Some("sk-test"))),
        config,
    )
}

pub fn registry(
    checkout: Arc<ScriptedCheckout>,
    images: Arc<CountingImages>,
    config: FulfillmentConfig,
) -> SessionRegistry {
    SessionRegistry::new(Arc::new(orchestrator(checkout, images, config)))
}
