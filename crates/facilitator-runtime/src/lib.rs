//! # Facilitator Runtime
//!
//! Relays stake and redeem messages between an origin chain and its
//! auxiliary chain.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the shared subsystem instances
//! - `adapters/` - JSON-RPC, proof and storage port implementations
//! - `wiring/` - seeding, subscription targets and service attachment
//! - `facilitator` - startup, periodic resubscription and shutdown
//!
//! ## Message Flow
//!
//! ```text
//! index push ──► Subscriber ──► DispatchLoop ──► handlers ──► Repositories
//!                                                                 │ notify
//!                                                                 ▼
//!               chain ◄── TransactionSubmitter ◄── reactive services
//! ```

pub mod adapters;
pub mod container;
pub mod facilitator;
pub mod wiring;

pub use container::{ChainPorts, FacilitatorConfig, SubsystemContainer};
pub use facilitator::Facilitator;
