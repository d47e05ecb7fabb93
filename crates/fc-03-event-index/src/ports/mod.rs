//! # Ports
//!
//! - `EventIndex`: the remote index (queries and live pushes)
//! - `BatchSink`: where decoded sweeps are delivered

pub mod outbound;

pub use outbound::*;
