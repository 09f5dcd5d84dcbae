//! Single-shot image generation.
//!
//! [`GenerationInvoker::generate`] issues exactly one provider request per
//! call (no retry, no caching by prompt), bounded by the configured timeout,
//! and returns either a canonical
//! [`ImageReference`](promptart_core::image::ImageReference) or a classified
//! [`GenerationFailure`].

use std::sync::Arc;
use std::time::Duration;

use promptart_core::image::{
    GenerationFailure, GenerationResult, ProviderImage, NO_IMAGE_RETURNED,
};
use promptart_core::prompt::Prompt;

use crate::api::GenerationRequest;
use crate::cache::ProviderClientCache;
use crate::config::ImageGenConfig;

/// Images requested per call.
const IMAGES_PER_REQUEST: u8 = 1;

/// Failure message when the provider does not answer within the timeout.
pub const PROVIDER_TIMED_OUT: &str = "The image API did not respond in time.";

pub struct GenerationInvoker {
    cache: Arc<ProviderClientCache>,
    model: String,
    size: String,
    timeout: Duration,
}

impl GenerationInvoker {
    pub fn new(cache: Arc<ProviderClientCache>, config: &ImageGenConfig) -> Self {
        Self {
            cache,
            model: config.model.clone(),
            size: config.size.clone(),
            timeout: config.timeout,
        }
    }

    /// Generate one image for `prompt`.
    ///
    /// A missing credential yields a configuration failure; anything that
    /// goes wrong at or after the provider call yields a provider failure.
    /// A call that outlives the timeout is abandoned and counts as a provider
    /// failure too.
    pub async fn generate(&self, prompt: &Prompt) -> GenerationResult {
        let client = self.cache.get_client().await.inspect_err(|failure| {
            tracing::error!(error = %failure, "Image provider is not configured");
        })?;

        let request = GenerationRequest {
            model: &self.model,
            prompt: prompt.as_str(),
            size: &self.size,
            n: IMAGES_PER_REQUEST,
        };

        tracing::info!(model = %self.model, size = %self.size, "Requesting image generation");

        let response = tokio::time::timeout(self.timeout, client.generate_image(&request))
            .await
            .map_err(|_| {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Image provider timed out");
                GenerationFailure::provider(PROVIDER_TIMED_OUT)
            })?
            .map_err(|e| {
                tracing::warn!(error = %e, "Image provider request failed");
                GenerationFailure::provider(e.to_string())
            })?;

        let image = response
            .data
            .into_iter()
            .next()
            .and_then(|data| ProviderImage::from_parts(data.url, data.b64_json))
            .ok_or_else(|| {
                tracing::warn!("Image provider returned no image");
                GenerationFailure::provider(NO_IMAGE_RETURNED)
            })?;

        let reference = image.into_reference()?;
        tracing::info!(inline = reference.is_data_uri(), "Image generated");
        Ok(reference)
    }
}
