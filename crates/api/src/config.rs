use std::time::Duration;

use promptart_checkout::config::CheckoutConfig;
use promptart_fulfillment::config::FulfillmentConfig;
use promptart_imagegen::config::ImageGenConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. The image
/// provider credential is deliberately absent: it is read lazily on first
/// generation, never at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Where buyers without a usable prompt are sent back to (default: `/`).
    pub start_url: String,
    pub imagegen: ImageGenConfig,
    pub checkout: CheckoutConfig,
    pub fulfillment: FulfillmentConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `120`                      |
    /// | `START_URL`            | `/`                        |
    ///
    /// Provider, checkout and fulfillment settings are loaded by their own
    /// crates' `from_env`. Panics when a provider timeout is not shorter than
    /// the request timeout.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Image generation routinely takes tens of seconds.
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let start_url = std::env::var("START_URL").unwrap_or_else(|_| "/".into());

        let config = Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            start_url,
            imagegen: ImageGenConfig::from_env(),
            checkout: CheckoutConfig::from_env(),
            fulfillment: FulfillmentConfig::from_env(),
        };
        assert!(
            config.provider_timeouts_fit(),
            "OPENAI_TIMEOUT_SECS and CHECKOUT_TIMEOUT_SECS must be below REQUEST_TIMEOUT_SECS"
        );
        config
    }

    /// Whether every provider call gives up before the request timeout does.
    pub fn provider_timeouts_fit(&self) -> bool {
        let request_timeout = Duration::from_secs(self.request_timeout_secs);
        self.imagegen.timeout < request_timeout && self.checkout.timeout < request_timeout
    }
}
