//! Process-wide provider client cache.
//!
//! [`ProviderClientCache`] builds the provider client on first use and hands
//! out the same instance afterwards. Construction requires a credential; when
//! it is missing the call fails with a configuration error and nothing is
//! cached, so the next call reads the credential again.
//!
//! Concurrent first access is single-flight: the slot is a
//! [`tokio::sync::OnceCell`], so at most one construction runs at a time and
//! every later caller receives the stored handle.

use std::sync::Arc;

use promptart_core::image::GenerationFailure;
use tokio::sync::OnceCell;

use crate::api::ImagesApi;
use crate::config::{ImageGenConfig, API_KEY_VAR};
use crate::provider::ImageProvider;

/// Shared handle to the provider client.
pub type ProviderHandle = Arc<dyn ImageProvider>;

/// Where the provider credential comes from.
pub trait CredentialSource: Send + Sync {
    /// Human-readable name of the credential, used in error messages.
    fn name(&self) -> &str;

    /// Current credential value, `None` when absent or blank.
    fn credential(&self) -> Option<String>;
}

/// Reads the credential from an environment variable on every call.
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn name(&self) -> &str {
        &self.var
    }

    fn credential(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

type ClientFactory = Box<dyn Fn(String) -> ProviderHandle + Send + Sync>;

/// Lazily constructed, write-once provider client.
pub struct ProviderClientCache {
    slot: OnceCell<ProviderHandle>,
    credentials: Box<dyn CredentialSource>,
    factory: ClientFactory,
}

impl ProviderClientCache {
    /// Create an empty cache.
    ///
    /// `factory` receives the credential and builds the client. It runs at
    /// most once per successful initialisation.
    pub fn new<C, F>(credentials: C, factory: F) -> Self
    where
        C: CredentialSource + 'static,
        F: Fn(String) -> ProviderHandle + Send + Sync + 'static,
    {
        Self {
            slot: OnceCell::new(),
            credentials: Box::new(credentials),
            factory: Box::new(factory),
        }
    }

    /// Cache for the OpenAI Images API keyed by `OPENAI_API_KEY`, sharing
    /// `client`'s connection pool.
    pub fn openai(config: &ImageGenConfig, client: reqwest::Client) -> Self {
        let api_url = config.api_url.clone();
        Self::new(EnvCredential::new(API_KEY_VAR), move |api_key| {
            Arc::new(ImagesApi::with_client(client.clone(), api_url.clone(), api_key))
                as ProviderHandle
        })
    }

    /// Return the cached client, constructing it on first use.
    pub async fn get_client(&self) -> Result<ProviderHandle, GenerationFailure> {
        self.slot
            .get_or_try_init(|| async {
                let credential = self.credentials.credential().ok_or_else(|| {
                    GenerationFailure::configuration(format!(
                        "{} is not configured.",
                        self.credentials.name()
                    ))
                })?;

                tracing::info!(
                    credential = self.credentials.name(),
                    "Constructing image provider client"
                );
                Ok::<_, GenerationFailure>((self.factory)(credential))
            })
            .await
            .map(Arc::clone)
    }

    /// Whether a client has been constructed.
    pub fn is_initialized(&self) -> bool {
        self.slot.initialized()
    }
}
