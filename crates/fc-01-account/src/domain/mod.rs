//! # Domain Module
//!
//! Bridge calls, transaction options, receipts and errors.

pub mod calls;
pub mod errors;
pub mod receipt;

pub use calls::*;
pub use errors::*;
pub use receipt::*;
