//! REST client for the checkout provider.
//!
//! - `POST /checkouts` creates a hosted checkout for an order.
//! - `GET  /checkouts/{id}` reports its payment status and metadata.
//!
//! Provider failures come back as an error object with a `message` field.

use std::time::Duration;

use promptart_core::payment::{PaymentReport, PaymentStatus};
use serde::Deserialize;

use crate::order::CheckoutOrder;

/// HTTP client for the checkout provider.
pub struct CheckoutApi {
    client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
    timeout: Option<Duration>,
}

/// A checkout created for an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedCheckout {
    pub id: String,
    pub checkout_url: String,
}

/// Raw payment-status payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutStatusResponse {
    pub status: PaymentStatus,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl CheckoutStatusResponse {
    /// Convert into a [`PaymentReport`], lifting `metadata.prompt` if present.
    pub fn into_report(self) -> PaymentReport {
        let prompt = self
            .metadata
            .as_ref()
            .and_then(|metadata| metadata.get("prompt"))
            .and_then(|prompt| prompt.as_str())
            .map(str::to_string);

        PaymentReport {
            status: self.status,
            prompt,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Errors from the checkout REST layer.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl CheckoutApi {
    /// * `api_url` - Base URL of the provider API, without trailing slash.
    pub fn new(api_url: String, access_token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, access_token)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url,
            access_token,
            timeout: None,
        }
    }

    /// Bound every request to `timeout`; an expired request fails with
    /// [`CheckoutApiError::Request`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create a hosted checkout for `order`.
    pub async fn create_checkout(
        &self,
        order: &CheckoutOrder,
    ) -> Result<CreatedCheckout, CheckoutApiError> {
        let request = self
            .client
            .post(format!("{}/checkouts", self.api_url))
            .json(order);

        let response = self.authorize(request).send().await?;
        Self::parse_response(response).await
    }

    /// Query the payment status of a checkout.
    ///
    /// `checkout_id` must already be validated as URL-safe.
    pub async fn payment_status(
        &self,
        checkout_id: &str,
    ) -> Result<PaymentReport, CheckoutApiError> {
        let request = self
            .client
            .get(format!("{}/checkouts/{}", self.api_url, checkout_id));

        let response = self.authorize(request).send().await?;
        let status: CheckoutStatusResponse = Self::parse_response(response).await?;
        Ok(status.into_report())
    }

    // ---- private helpers ----

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        };
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Parse a successful JSON body, or turn a non-2xx answer into
    /// [`CheckoutApiError::Rejected`] carrying the provider's `message`.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CheckoutApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|error| error.message)
                .unwrap_or(body);
            return Err(CheckoutApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
