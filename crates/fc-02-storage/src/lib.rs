//! # FC-02 Storage
//!
//! Durable state of the facilitator.
//!
//! ## Entities
//!
//! | Entity | Key | Mutated by |
//! |--------|-----|------------|
//! | `Message` | message hash | declared / confirmed / progressed handlers, accept service |
//! | `Request` | request hash | requested handler, declared handler, accept service |
//! | `ContractEntity` | (contract, kind) | event index fetcher (uts cursor) |
//! | `AuxiliaryChain` | chain id | state-root handler (heights only) |
//! | `Gateway` | gateway address | gateway-proven handler (height only) |
//!
//! Statuses and heights only move forward. Nothing is deleted.
//!
//! ## Notification
//!
//! Each repository owns a [`shared_bus::Subject`]. A successful `save` stages
//! the saved entity; [`Repositories::notify`] delivers everything staged to
//! the attached observers.
//!
//! ## Module Structure
//!
//! ```text
//! fc-02-storage/
//! ├── domain/          # entities, value objects, errors
//! ├── ports/           # KeyValueStore + in-memory store
//! ├── repository/      # typed repositories over the store
//! └── locks            # key-striped locks for read-modify-write
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod locks;
pub mod ports;
pub mod repository;

pub use domain::{
    AnchorRole, AuxiliaryChain, ContractEntity, EntityKind, Gateway, GatewayType, Message,
    MessageDirection, MessageStatus, MessageType, Request, Sighting, StorageError,
};
pub use locks::KeyedLocks;
pub use ports::{BatchOperation, InMemoryKVStore, KeyValueStore};
pub use repository::{
    AuxiliaryChainRepository, ContractEntityRepository, GatewayRepository, MessageRepository,
    Repositories, RequestRepository,
};
