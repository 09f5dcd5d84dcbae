use std::time::Duration;

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Image provider configuration loaded from environment variables.
///
/// The API key is deliberately not part of this struct: it is read on demand
/// by the client cache so a missing key surfaces as a configuration error on
/// use instead of preventing startup.
#[derive(Debug, Clone)]
pub struct ImageGenConfig {
    /// Base URL of the Images API (default: `https://api.openai.com/v1`).
    pub api_url: String,
    /// Model name sent with every request (default: `gpt-image-1`).
    pub model: String,
    /// Fixed output resolution (default: `1024x1024`).
    pub size: String,
    /// Upper bound on one provider call (default: 90 s). Must stay below the
    /// server's request timeout so a slow provider reports as a provider error.
    pub timeout: Duration,
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".into(),
            model: "gpt-image-1".into(),
            size: "1024x1024".into(),
            timeout: Duration::from_secs(90),
        }
    }
}

impl ImageGenConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                     |
    /// |----------------------|-----------------------------|
    /// | `OPENAI_API_URL`     | `https://api.openai.com/v1` |
    /// | `OPENAI_IMAGE_MODEL` | `gpt-image-1`               |
    /// | `OPENAI_IMAGE_SIZE`  | `1024x1024`                 |
    /// | `OPENAI_TIMEOUT_SECS`| `90`                        |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_url = std::env::var("OPENAI_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let model = std::env::var("OPENAI_IMAGE_MODEL").unwrap_or(defaults.model);
        let size = std::env::var("OPENAI_IMAGE_SIZE").unwrap_or(defaults.size);
        let timeout = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .map(|v| v.parse().expect("OPENAI_TIMEOUT_SECS must be a valid u64"))
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            api_url,
            model,
            size,
            timeout,
        }
    }
}
