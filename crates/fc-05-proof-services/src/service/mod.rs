//! # Service Layer
//!
//! Observers that turn stored state into transactions. Each re-derives its
//! work from the repositories on every trigger.

pub mod accept_request;
pub mod confirm_intent;
pub mod inflight;
pub mod progress;
pub mod prove_gateway;

pub use accept_request::{generate_secret, AcceptRequestService};
pub use confirm_intent::ConfirmIntentService;
pub use inflight::InFlight;
pub use progress::{ProgressService, ProgressStep};
pub use prove_gateway::ProveGatewayService;
