//! # Ports

pub mod handler;

pub use handler::ContractEntityHandler;
