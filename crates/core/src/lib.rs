//! Domain types and pure logic for the prompt-to-purchase flow.
//!
//! Nothing in this crate performs I/O. The provider clients, the session
//! driver and the HTTP layer build on these types.

pub mod error;
pub mod fulfillment;
pub mod image;
pub mod payment;
pub mod prompt;
