//! Mobile-money payment gateway adapters.
//!
//! - `client` - MTN MoMo collection API (`requesttopay`)
//! - `mock` - scripted gateway for tests and local development

mod client;
mod mock;

pub use client::{MomoConfig, MomoEnvironment, MomoGateway};
pub use mock::MockPaymentGateway;
