use async_trait::async_trait;

use crate::api::{GenerationRequest, ImagesApi, ImagesApiError, ImagesResponse};

/// A client able to run one image generation request.
///
/// Implemented by [`ImagesApi`] in production; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<ImagesResponse, ImagesApiError>;
}

#[async_trait]
impl ImageProvider for ImagesApi {
    async fn generate_image(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<ImagesResponse, ImagesApiError> {
        self.generate(request).await
    }
}
