//! # Domain Module
//!
//! Entities persisted by the facilitator.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use value_objects::*;
