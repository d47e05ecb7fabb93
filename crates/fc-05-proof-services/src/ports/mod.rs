//! # Ports

pub mod outbound;

pub use outbound::{MockProofGenerator, ProofGenerator};
