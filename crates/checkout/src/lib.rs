//! Checkout provider client.
//!
//! Builds the order for a prompt, creates hosted checkouts and queries their
//! payment status. The [`CheckoutProvider`](provider::CheckoutProvider) trait
//! is the seam the orchestrator and the HTTP layer depend on.

pub mod api;
pub mod config;
pub mod order;
pub mod provider;
