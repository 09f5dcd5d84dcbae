//! Image generation provider client.
//!
//! Provides the REST wrapper for the OpenAI Images API, the
//! [`ImageProvider`](provider::ImageProvider) seam, the lazily built
//! process-wide client cache, and the [`GenerationInvoker`](invoker::GenerationInvoker)
//! that turns a prompt into a canonical image reference.

pub mod api;
pub mod cache;
pub mod config;
pub mod invoker;
pub mod provider;
