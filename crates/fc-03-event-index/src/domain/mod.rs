//! # Domain Module
//!
//! Typed records and errors of the event index client.

pub mod errors;
pub mod records;

pub use errors::*;
pub use records::*;
