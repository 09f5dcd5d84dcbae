//! Payment status as reported by the checkout provider.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Metadata `type` tag attached to every order created by this service.
pub const ORDER_KIND_IMAGE_GENERATION: &str = "image_generation";

/// Maximum length of a checkout id accepted from clients.
pub const MAX_CHECKOUT_ID_LENGTH: usize = 128;

/// Validate a checkout id received from a client.
///
/// Ids end up in provider URL paths, so only ASCII alphanumerics, `-` and `_`
/// are accepted.
pub fn validate_checkout_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() || id.len() > MAX_CHECKOUT_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Checkout id must be between 1 and {MAX_CHECKOUT_ID_LENGTH} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Invalid checkout id '{id}'"
        )));
    }
    Ok(())
}

/// Payment state of a checkout.
///
/// Providers use several words for a checkout that will never be paid; all of
/// them collapse into [`PaymentStatus::Rejected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    #[serde(alias = "expired", alias = "failed", alias = "canceled", alias = "cancelled")]
    Rejected,
}

impl PaymentStatus {
    /// Whether the provider has reached a final answer.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One answer from the payment-status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReport {
    pub status: PaymentStatus,
    /// Prompt carried in the order metadata, if the provider echoed it back.
    pub prompt: Option<String>,
}

impl PaymentReport {
    pub fn new(status: PaymentStatus) -> Self {
        Self {
            status,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}
