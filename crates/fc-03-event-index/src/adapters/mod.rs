//! # Adapters
//!
//! - `GraphQlIndexClient`: HTTP queries plus `graphql-ws` subscriptions
//! - `InMemoryEventIndex`: in-process index for tests and local runs

pub mod graphql;
pub mod memory;

pub use graphql::GraphQlIndexClient;
pub use memory::InMemoryEventIndex;
