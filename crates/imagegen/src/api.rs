//! REST client for the OpenAI Images API.
//!
//! Wraps `POST /images/generations` using [`reqwest`]. The response is
//! returned as-is; picking between the URL and the inline payload is the
//! invoker's job.

use serde::{Deserialize, Serialize};

/// HTTP client for the Images API, bound to one API key.
pub struct ImagesApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Body of a generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub size: &'a str,
    pub n: u8,
}

/// Response returned by `/images/generations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

/// One generated image. Depending on the model the provider fills either
/// `url` or `b64_json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

impl ImagesResponse {
    /// Response carrying a single hosted image.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            data: vec![ImageData {
                url: Some(url.into()),
                ..ImageData::default()
            }],
        }
    }

    /// Response carrying a single inline base64 image.
    pub fn with_b64_json(data: impl Into<String>) -> Self {
        Self {
            data: vec![ImageData {
                b64_json: Some(data.into()),
                ..ImageData::default()
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Errors from the Images API layer.
#[derive(Debug, thiserror::Error)]
pub enum ImagesApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status. `message` is the provider's
    /// own error text when the body followed the documented error shape,
    /// otherwise the raw body.
    #[error("{message}")]
    ApiError { status: u16, message: String },
}

impl ImagesApi {
    /// Create a client with its own connection pool.
    ///
    /// * `api_url` - Base URL, e.g. `https://api.openai.com/v1`.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Request one image for `prompt`.
    pub async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<ImagesResponse, ImagesApiError> {
        let response = self
            .client
            .post(format!("{}/images/generations", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ImagesApiError::ApiError {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        Ok(response.json::<ImagesResponse>().await?)
    }
}

/// Pull `error.message` out of a provider error body, falling back to the
/// body itself.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.to_string())
}
