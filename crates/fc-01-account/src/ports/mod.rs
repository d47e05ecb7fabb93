//! # Ports
//!
//! Chain-facing dependencies of the account layer.

pub mod outbound;

pub use outbound::*;
