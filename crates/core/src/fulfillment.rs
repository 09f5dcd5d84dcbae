//! Fulfillment state machine.
//!
//! One [`FulfillmentMachine`] tracks one fulfillment session. Events are fed
//! in one at a time through [`FulfillmentMachine::apply`], which either moves
//! the machine forward (optionally asking the caller to perform an
//! [`Effect`]) or rejects the event and leaves the state untouched.
//!
//! Transition rules:
//! - `awaiting_payment` -> `verifying` on checkout completion with a usable prompt
//! - `verifying`        -> `generating` when the payment is paid
//! - `verifying`        -> `payment_rejected` when rejected or verification expires
//! - `generating`       -> `ready` / `generation_failed` on the generation outcome
//!
//! `payment_rejected`, `ready` and `generation_failed` are terminal.

use serde::Serialize;

use crate::error::CoreError;
use crate::image::{GenerationResult, ImageReference};
use crate::payment::PaymentStatus;
use crate::prompt::Prompt;

/// Current state of a fulfillment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentState {
    AwaitingPayment,
    Verifying,
    PaymentRejected,
    Generating,
    Ready(ImageReference),
    GenerationFailed(String),
}

/// Payload-free label for a [`FulfillmentState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    AwaitingPayment,
    Verifying,
    PaymentRejected,
    Generating,
    Ready,
    GenerationFailed,
}

impl FulfillmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "awaiting_payment",
            Self::Verifying => "verifying",
            Self::PaymentRejected => "payment_rejected",
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::GenerationFailed => "generation_failed",
        }
    }
}

impl FulfillmentState {
    pub fn status(&self) -> FulfillmentStatus {
        match self {
            Self::AwaitingPayment => FulfillmentStatus::AwaitingPayment,
            Self::Verifying => FulfillmentStatus::Verifying,
            Self::PaymentRejected => FulfillmentStatus::PaymentRejected,
            Self::Generating => FulfillmentStatus::Generating,
            Self::Ready(_) => FulfillmentStatus::Ready,
            Self::GenerationFailed(_) => FulfillmentStatus::GenerationFailed,
        }
    }

    /// No further event is accepted in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PaymentRejected | Self::Ready(_) | Self::GenerationFailed(_)
        )
    }

    /// True once the payment has been confirmed, independent of generation.
    pub fn payment_verified(&self) -> bool {
        matches!(
            self,
            Self::Generating | Self::Ready(_) | Self::GenerationFailed(_)
        )
    }

    /// True while the generation call is in flight.
    pub fn generating(&self) -> bool {
        matches!(self, Self::Generating)
    }
}

/// Input to the state machine.
#[derive(Debug, Clone)]
pub enum FulfillmentEvent {
    /// The buyer returned from checkout. Carries the raw prompt, if any.
    CheckoutCompleted { prompt: Option<String> },
    /// The payment-status query answered.
    PaymentResolved(PaymentStatus),
    /// Verification ran out of time without a definite answer.
    VerificationExpired,
    /// The generation call returned.
    GenerationFinished(GenerationResult),
}

impl FulfillmentEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::CheckoutCompleted { .. } => "checkout_completed",
            Self::PaymentResolved(_) => "payment_resolved",
            Self::VerificationExpired => "verification_expired",
            Self::GenerationFinished(_) => "generation_finished",
        }
    }
}

/// Side effect the caller must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// No usable prompt: send the buyer back to the start page.
    RedirectToStart,
    /// Payment confirmed: run exactly one generation for this prompt.
    StartGeneration(Prompt),
}

/// State machine for a single fulfillment session.
#[derive(Debug, Clone)]
pub struct FulfillmentMachine {
    state: FulfillmentState,
    prompt: Option<Prompt>,
    trail: Vec<FulfillmentStatus>,
}

impl Default for FulfillmentMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl FulfillmentMachine {
    pub fn new() -> Self {
        Self {
            state: FulfillmentState::AwaitingPayment,
            prompt: None,
            trail: vec![FulfillmentStatus::AwaitingPayment],
        }
    }

    pub fn state(&self) -> &FulfillmentState {
        &self.state
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Every status visited so far, in order.
    pub fn trail(&self) -> &[FulfillmentStatus] {
        &self.trail
    }

    /// Apply one event.
    ///
    /// Returns the effect to perform, if any. Events that do not fit the
    /// current state are rejected with [`CoreError::Conflict`] and change
    /// nothing.
    pub fn apply(&mut self, event: FulfillmentEvent) -> Result<Option<Effect>, CoreError> {
        use FulfillmentEvent as E;
        use FulfillmentStatus as S;

        let current = self.state.status();
        match (current, event) {
            (S::AwaitingPayment, E::CheckoutCompleted { prompt }) => {
                match Prompt::parse_optional(prompt.as_deref()) {
                    Ok(prompt) => {
                        self.prompt = Some(prompt);
                        self.enter(FulfillmentState::Verifying);
                        Ok(None)
                    }
                    Err(_) => Ok(Some(Effect::RedirectToStart)),
                }
            }
            (S::Verifying, E::PaymentResolved(PaymentStatus::Pending)) => Ok(None),
            (S::Verifying, E::PaymentResolved(PaymentStatus::Paid)) => {
                let prompt = self.prompt.clone().ok_or_else(|| {
                    CoreError::Internal("verifying session has no prompt".to_string())
                })?;
                self.enter(FulfillmentState::Generating);
                Ok(Some(Effect::StartGeneration(prompt)))
            }
            (S::Verifying, E::PaymentResolved(PaymentStatus::Rejected))
            | (S::Verifying, E::VerificationExpired) => {
                self.enter(FulfillmentState::PaymentRejected);
                Ok(None)
            }
            (S::Generating, E::GenerationFinished(Ok(image))) => {
                self.enter(FulfillmentState::Ready(image));
                Ok(None)
            }
            (S::Generating, E::GenerationFinished(Err(failure))) => {
                self.enter(FulfillmentState::GenerationFailed(failure.message));
                Ok(None)
            }
            (current, event) => Err(CoreError::Conflict(format!(
                "Cannot apply '{}' to a fulfillment session in state '{}'",
                event.name(),
                current.as_str()
            ))),
        }
    }

    fn enter(&mut self, next: FulfillmentState) {
        self.trail.push(next.status());
        self.state = next;
    }
}
