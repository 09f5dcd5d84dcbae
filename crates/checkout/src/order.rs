//! Order description sent to the checkout provider.

use promptart_core::error::CoreError;
use promptart_core::payment::ORDER_KIND_IMAGE_GENERATION;
use promptart_core::prompt::Prompt;
use serde::{Deserialize, Serialize};

use crate::config::CheckoutConfig;

/// Customer fields the hosted checkout must collect.
pub const REQUIRED_CUSTOMER_FIELDS: &[&str] = &["email"];

/// Path of the page the buyer lands on after paying.
pub const SUCCESS_PATH: &str = "/success";

/// A single-item order for one generated image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub title: String,
    /// The trimmed prompt, shown to the buyer on the checkout page.
    pub description: String,
    pub amount: u64,
    pub currency: String,
    pub success_url: String,
    pub required_customer_fields: Vec<String>,
    pub metadata: OrderMetadata,
}

/// Metadata echoed back by the provider with the payment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt: String,
}

impl CheckoutOrder {
    /// Build the order for `prompt` using the configured price and redirect.
    pub fn for_prompt(prompt: &Prompt, config: &CheckoutConfig) -> Result<Self, CoreError> {
        Ok(Self {
            title: config.title.clone(),
            description: prompt.as_str().to_string(),
            amount: config.amount,
            currency: config.currency.clone(),
            success_url: success_url(&config.public_base_url, prompt)?,
            required_customer_fields: REQUIRED_CUSTOMER_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            metadata: OrderMetadata {
                kind: ORDER_KIND_IMAGE_GENERATION.to_string(),
                prompt: prompt.as_str().to_string(),
            },
        })
    }
}

/// Build `{base}/success?prompt=<encoded prompt>`.
pub fn success_url(public_base_url: &str, prompt: &Prompt) -> Result<String, CoreError> {
    let raw = format!("{}{SUCCESS_PATH}", public_base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&raw).map_err(|e| {
        CoreError::Configuration(format!("Invalid PUBLIC_BASE_URL '{public_base_url}': {e}"))
    })?;
    url.query_pairs_mut().append_pair("prompt", prompt.as_str());
    Ok(url.into())
}
