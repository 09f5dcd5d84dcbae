use std::time::Duration;

/// Checkout provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the checkout provider API (default: `http://localhost:8787`).
    pub api_url: String,
    /// Bearer token sent to the provider, if set.
    pub access_token: Option<String>,
    /// Price of one image in the smallest unit of `currency` (default: `20`).
    pub amount: u64,
    /// Currency code (default: `SAT`).
    pub currency: String,
    /// Order title shown on the hosted checkout (default: `AI-Generated Image`).
    pub title: String,
    /// Public base URL of this service, used to build the success redirect
    /// (default: `http://localhost:3000`).
    pub public_base_url: String,
    /// Upper bound on one provider request (default: 15 s).
    pub timeout: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8787".into(),
            access_token: None,
            amount: 20,
            currency: "SAT".into(),
            title: "AI-Generated Image".into(),
            public_base_url: "http://localhost:3000".into(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `CHECKOUT_API_URL`      | `http://localhost:8787` |
    /// | `CHECKOUT_ACCESS_TOKEN` | unset                   |
    /// | `CHECKOUT_AMOUNT`       | `20`                    |
    /// | `CHECKOUT_CURRENCY`     | `SAT`                   |
    /// | `CHECKOUT_TITLE`        | `AI-Generated Image`    |
    /// | `PUBLIC_BASE_URL`       | `http://localhost:3000` |
    /// | `CHECKOUT_TIMEOUT_SECS` | `15`                    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("CHECKOUT_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);

        let access_token = std::env::var("CHECKOUT_ACCESS_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let amount: u64 = std::env::var("CHECKOUT_AMOUNT")
            .map(|raw| raw.parse().expect("CHECKOUT_AMOUNT must be a valid u64"))
            .unwrap_or(defaults.amount);

        let currency = std::env::var("CHECKOUT_CURRENCY").unwrap_or(defaults.currency);
        let title = std::env::var("CHECKOUT_TITLE").unwrap_or(defaults.title);

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_base_url);

        let timeout = std::env::var("CHECKOUT_TIMEOUT_SECS")
            .map(|raw| raw.parse().expect("CHECKOUT_TIMEOUT_SECS must be a valid u64"))
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_url,
            access_token,
            amount,
            currency,
            title,
            public_base_url,
            timeout,
        }
    }
}
