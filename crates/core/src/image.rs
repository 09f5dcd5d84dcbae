//! Canonical image references and generation outcomes.
//!
//! Image providers answer in one of two shapes: a hosted URL or an inline
//! base64 payload. [`ProviderImage`] models exactly those two shapes and
//! [`ProviderImage::into_reference`] collapses them into the single
//! [`ImageReference`] the rest of the system deals with.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::error::CoreError;

/// MIME type assumed for inline payloads.
pub const INLINE_IMAGE_MIME: &str = "image/png";

/// Message used when a provider response carries neither shape.
pub const NO_IMAGE_RETURNED: &str = "The image API did not return a URL.";

/// A normalized, displayable image location: either a network URL or a
/// `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two response shapes an image provider may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderImage {
    DirectUrl(String),
    InlineEncoded(String),
}

impl ProviderImage {
    /// Pick a shape from the optional provider fields, preferring the URL.
    ///
    /// Empty strings count as absent. Returns `None` when neither field is
    /// usable.
    pub fn from_parts(url: Option<String>, b64_json: Option<String>) -> Option<Self> {
        match (url, b64_json) {
            (Some(url), _) if !url.trim().is_empty() => Some(Self::DirectUrl(url)),
            (_, Some(data)) if !data.trim().is_empty() => Some(Self::InlineEncoded(data)),
            _ => None,
        }
    }

    /// Resolve into a canonical reference.
    ///
    /// URLs pass through untouched. Inline payloads must decode as standard
    /// base64 and are wrapped into a PNG data URI.
    pub fn into_reference(self) -> Result<ImageReference, GenerationFailure> {
        match self {
            Self::DirectUrl(url) => Ok(ImageReference(url)),
            Self::InlineEncoded(data) => {
                let data = data.trim();
                STANDARD.decode(data).map_err(|e| {
                    GenerationFailure::provider(format!("Image payload is not valid base64: {e}"))
                })?;
                Ok(ImageReference(format!(
                    "data:{INLINE_IMAGE_MIME};base64,{data}"
                )))
            }
        }
    }
}

/// Failure classes of a generation call.
///
/// The distinction is kept end to end: configuration failures are an operator
/// problem, provider failures may be retried by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Provider,
}

/// Typed failure of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GenerationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl GenerationFailure {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Configuration,
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Provider,
            message: message.into(),
        }
    }
}

impl From<GenerationFailure> for CoreError {
    fn from(failure: GenerationFailure) -> Self {
        match failure.kind {
            FailureKind::Configuration => CoreError::Configuration(failure.message),
            FailureKind::Provider => CoreError::Provider(failure.message),
        }
    }
}

/// Outcome of one generation call.
pub type GenerationResult = Result<ImageReference, GenerationFailure>;
