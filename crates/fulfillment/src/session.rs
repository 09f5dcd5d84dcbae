//! Fulfillment sessions.
//!
//! [`FulfillmentOrchestrator::start_session`] feeds the checkout completion
//! into a fresh [`FulfillmentMachine`] and, when the prompt is usable, spawns
//! a driver task that owns the machine from then on. Observers read the
//! latest [`FulfillmentSnapshot`] through a `watch` channel held by
//! [`FulfillmentSession`].
//!
//! Dropping every [`FulfillmentSession`] handle abandons the session: polling
//! stops at the next tick, and a generation already in flight runs to
//! completion but its result is discarded.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use promptart_checkout::provider::CheckoutProvider;
use promptart_core::fulfillment::{
    Effect, FulfillmentEvent, FulfillmentMachine, FulfillmentState, FulfillmentStatus,
};
use promptart_core::payment::PaymentStatus;
use promptart_imagegen::invoker::GenerationInvoker;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::config::FulfillmentConfig;

/// Point-in-time view of a session, as exposed to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentSnapshot {
    pub session_id: Uuid,
    pub checkout_id: String,
    pub prompt: Option<String>,
    pub status: FulfillmentStatus,
    pub payment_verified: bool,
    pub generating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub trail: Vec<FulfillmentStatus>,
    pub updated_at: DateTime<Utc>,
}

impl FulfillmentSnapshot {
    fn capture(session_id: Uuid, checkout_id: &str, machine: &FulfillmentMachine) -> Self {
        let state = machine.state();
        let (image_url, error) = match state {
            FulfillmentState::Ready(image) => (Some(image.to_string()), None),
            FulfillmentState::GenerationFailed(message) => (None, Some(message.clone())),
            _ => (None, None),
        };

        Self {
            session_id,
            checkout_id: checkout_id.to_string(),
            prompt: machine.prompt().map(|p| p.as_str().to_string()),
            status: state.status(),
            payment_verified: state.payment_verified(),
            generating: state.generating(),
            image_url,
            error,
            trail: machine.trail().to_vec(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            FulfillmentStatus::PaymentRejected
                | FulfillmentStatus::Ready
                | FulfillmentStatus::GenerationFailed
        )
    }
}

/// Handle to a running (or finished) session.
#[derive(Debug, Clone)]
pub struct FulfillmentSession {
    id: Uuid,
    checkout_id: String,
    created_at: DateTime<Utc>,
    state: watch::Receiver<FulfillmentSnapshot>,
}

impl FulfillmentSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn checkout_id(&self) -> &str {
        &self.checkout_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> FulfillmentSnapshot {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FulfillmentSnapshot> {
        self.state.clone()
    }

    /// Wait until the session reaches a terminal state.
    ///
    /// If the driver is gone before that, the last snapshot is returned.
    pub async fn wait_until_terminal(&self) -> FulfillmentSnapshot {
        let mut rx = self.state.clone();
        if let Ok(snapshot) = rx.wait_for(FulfillmentSnapshot::is_terminal).await {
            return snapshot.clone();
        }
        let last = rx.borrow().clone();
        last
    }
}

/// Outcome of [`FulfillmentOrchestrator::start_session`].
#[derive(Debug)]
pub enum SessionStart {
    Started(FulfillmentSession),
    /// No usable prompt could be found for the checkout.
    RedirectToStart,
}

/// Creates sessions and spawns their drivers.
pub struct FulfillmentOrchestrator {
    checkout: Arc<dyn CheckoutProvider>,
    invoker: Arc<GenerationInvoker>,
    config: FulfillmentConfig,
}

impl FulfillmentOrchestrator {
    pub fn new(
        checkout: Arc<dyn CheckoutProvider>,
        invoker: Arc<GenerationInvoker>,
        config: FulfillmentConfig,
    ) -> Self {
        Self {
            checkout,
            invoker,
            config,
        }
    }

    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }

    /// Start a session for a buyer returning from `checkout_id`.
    ///
    /// Shorthand for [`prepare`](Self::prepare) followed by
    /// [`launch`](Self::launch).
    pub async fn start_session(&self, checkout_id: &str, prompt: Option<&str>) -> SessionStart {
        match self.prepare(checkout_id, prompt).await {
            Some(prepared) => SessionStart::Started(self.launch(prepared)),
            None => SessionStart::RedirectToStart,
        }
    }

    /// Resolve the prompt for `checkout_id` and complete the checkout step.
    ///
    /// `prompt` is the prompt carried by the success redirect. When it is
    /// missing or blank the payment status is queried once and the prompt
    /// stored in the order metadata is used instead; that answer also counts
    /// as the first poll. Returns `None` when the buyer must start over.
    ///
    /// Nothing is spawned here, so the result may be dropped freely.
    pub async fn prepare(
        &self,
        checkout_id: &str,
        prompt: Option<&str>,
    ) -> Option<PreparedSession> {
        let mut prompt = prompt
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let mut first_status = None;

        if prompt.is_none() {
            match self.checkout.payment_status(checkout_id).await {
                Ok(report) => {
                    tracing::debug!(
                        checkout_id,
                        from_metadata = report.prompt.is_some(),
                        "Recovered prompt from checkout metadata"
                    );
                    prompt = report.prompt;
                    first_status = Some(report.status);
                }
                Err(e) => {
                    tracing::warn!(checkout_id, error = %e, "Payment status lookup failed");
                }
            }
        }

        let mut machine = FulfillmentMachine::new();
        match machine.apply(FulfillmentEvent::CheckoutCompleted { prompt }) {
            Ok(None) => Some(PreparedSession {
                checkout_id: checkout_id.to_string(),
                machine,
                first_status,
            }),
            Ok(Some(Effect::RedirectToStart)) => {
                tracing::info!(checkout_id, "No usable prompt, redirecting to start");
                None
            }
            Ok(Some(effect)) => {
                tracing::error!(checkout_id, ?effect, "Unexpected effect on checkout completion");
                None
            }
            Err(e) => {
                tracing::error!(checkout_id, error = %e, "Checkout completion rejected");
                None
            }
        }
    }

    /// Spawn the driver for a prepared session and return its handle.
    pub fn launch(&self, prepared: PreparedSession) -> FulfillmentSession {
        let PreparedSession {
            checkout_id,
            machine,
            first_status,
        } = prepared;

        let session_id = Uuid::now_v7();
        let (tx, rx) = watch::channel(FulfillmentSnapshot::capture(
            session_id,
            &checkout_id,
            &machine,
        ));

        let driver = SessionDriver {
            session_id,
            checkout_id: checkout_id.clone(),
            checkout: Arc::clone(&self.checkout),
            invoker: Arc::clone(&self.invoker),
            config: self.config.clone(),
            tx,
        };
        tokio::spawn(driver.run(machine, first_status));

        tracing::info!(%session_id, checkout_id, "Fulfillment session started");

        FulfillmentSession {
            id: session_id,
            checkout_id,
            created_at: Utc::now(),
            state: rx,
        }
    }
}

/// A checkout whose prompt is known but whose driver has not started yet.
#[derive(Debug)]
pub struct PreparedSession {
    checkout_id: String,
    machine: FulfillmentMachine,
    first_status: Option<PaymentStatus>,
}

/// Owns one machine and carries out its effects.
struct SessionDriver {
    session_id: Uuid,
    checkout_id: String,
    checkout: Arc<dyn CheckoutProvider>,
    invoker: Arc<GenerationInvoker>,
    config: FulfillmentConfig,
    tx: watch::Sender<FulfillmentSnapshot>,
}

impl SessionDriver {
    async fn run(self, mut machine: FulfillmentMachine, first_status: Option<PaymentStatus>) {
        let deadline = Instant::now() + self.config.verify_timeout;
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick fires immediately; skip it when a status is already known.
        let mut pending = first_status;
        if pending.is_some() {
            interval.tick().await;
        }

        loop {
            if self.tx.is_closed() {
                tracing::debug!(
                    session_id = %self.session_id,
                    "Session abandoned, stopping verification"
                );
                return;
            }

            let event = match pending.take() {
                Some(status) => FulfillmentEvent::PaymentResolved(status),
                None => match self.poll(&mut interval, deadline).await {
                    Some(event) => event,
                    None => continue,
                },
            };

            match machine.apply(event) {
                Ok(Some(Effect::StartGeneration(prompt))) => {
                    self.publish(&machine);
                    let outcome = self.invoker.generate(&prompt).await;
                    let finished = FulfillmentEvent::GenerationFinished(outcome);
                    if let Err(e) = machine.apply(finished) {
                        tracing::error!(
                            session_id = %self.session_id,
                            error = %e,
                            "Generation outcome rejected"
                        );
                    }
                    self.publish(&machine);
                    return;
                }
                Ok(_) => {
                    if machine.state().status() != FulfillmentStatus::Verifying {
                        self.publish(&machine);
                    }
                    if machine.state().is_terminal() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        session_id = %self.session_id,
                        error = %e,
                        "Session event rejected"
                    );
                    return;
                }
            }
        }
    }

    /// Wait for the next tick and query the payment status once.
    ///
    /// Returns `None` when the query failed and should be retried.
    async fn poll(
        &self,
        interval: &mut tokio::time::Interval,
        deadline: Instant,
    ) -> Option<FulfillmentEvent> {
        if tokio::time::timeout_at(deadline, interval.tick()).await.is_err() {
            return Some(self.expired());
        }

        match tokio::time::timeout_at(deadline, self.checkout.payment_status(&self.checkout_id))
            .await
        {
            Err(_) => Some(self.expired()),
            Ok(Ok(report)) => {
                tracing::debug!(
                    session_id = %self.session_id,
                    status = ?report.status,
                    "Payment status polled"
                );
                Some(FulfillmentEvent::PaymentResolved(report.status))
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    error = %e,
                    "Payment status poll failed"
                );
                None
            }
        }
    }

    fn expired(&self) -> FulfillmentEvent {
        tracing::info!(
            session_id = %self.session_id,
            timeout_secs = self.config.verify_timeout.as_secs(),
            "Payment verification timed out"
        );
        FulfillmentEvent::VerificationExpired
    }

    fn publish(&self, machine: &FulfillmentMachine) {
        let snapshot = FulfillmentSnapshot::capture(self.session_id, &self.checkout_id, machine);
        tracing::info!(
            session_id = %self.session_id,
            status = snapshot.status.as_str(),
            "Fulfillment state changed"
        );
        if self.tx.send(snapshot).is_err() {
            tracing::debug!(session_id = %self.session_id, "Session abandoned, update discarded");
        }
    }
}
