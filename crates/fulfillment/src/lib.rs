//! Fulfillment orchestration.
//!
//! Drives one [`FulfillmentMachine`](promptart_core::fulfillment::FulfillmentMachine)
//! per checkout: polls the payment status, runs the single generation call once
//! the payment is confirmed, and publishes every state change as a
//! [`FulfillmentSnapshot`](session::FulfillmentSnapshot).

pub mod config;
pub mod registry;
pub mod session;
pub mod sweeper;
