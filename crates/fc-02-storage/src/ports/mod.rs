//! # Ports
//!
//! Persistence contract the repositories are written against.

pub mod outbound;

pub use outbound::*;
