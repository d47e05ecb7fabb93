//! # Subsystem Wiring
//!
//! Connects the subsystems of the container.
//!
//! ```text
//!  origin index ──► Subscriber(origin) ─┐
//!                                       ├─► DispatchHandle ──► DispatchLoop ──► TransactionDispatcher
//!  aux index ─────► Subscriber(aux) ────┘                                           │
//!                                                                                   ▼
//!                                                                   Repositories (save + stage)
//!                                                                                   │ notify
//!                                                                                   ▼
//!                                                                   services ──► TransactionSubmitter
//! ```
//!
//! - `seed` - static auxiliary chain and gateway rows from configuration
//! - `subscriptions` - (kind, contract) targets per chain
//! - `services` - observers on the repository subjects

pub mod seed;
pub mod services;
pub mod subscriptions;

pub use seed::{auxiliary_chain_row, gateway_row, seed_static_rows};
pub use services::{attach_services, AttachedServices};
pub use subscriptions::{build_subscriber, subscription_targets};
