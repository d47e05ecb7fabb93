//! # FC-03 Event Index Client
//!
//! Pulls bridge events out of a GraphQL event index.
//!
//! ## Flow
//!
//! ```text
//! push ──► Subscriber task ──► TransactionFetcher::fetch (pages after cursor)
//!                                   │
//!                                   ▼
//!                           BatchSink::deliver (awaits the dispatcher)
//!                                   │ Ok
//!                                   ▼
//!                       TransactionFetcher::commit (cursor = max uts)
//! ```
//!
//! Delivery is at-least-once: a failed page or a failed delivery leaves the
//! cursor where it was, and the next push repeats the sweep.
//!
//! ## Module Structure
//!
//! ```text
//! fc-03-event-index/
//! ├── domain/     # RecordMeta, ChainEvent, IndexError
//! ├── ports/      # EventIndex, BatchSink
//! ├── service/    # TransactionFetcher, Subscriber
//! └── adapters/   # GraphQL client, in-memory index
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{GraphQlIndexClient, InMemoryEventIndex};
pub use domain::{
    selection, ChainEvent, ConfirmedRecord, DeclaredRecord, EventBatch, GatewayProvenRecord,
    IndexError, IndexedRecord, ProgressedRecord, RecordMeta, RequestedRecord,
    StateRootAvailableRecord,
};
pub use ports::{BatchSink, EventIndex, IndexSubscription, PageQuery};
pub use service::{Subscriber, SubscriptionTarget, Sweep, TransactionFetcher, DEFAULT_PAGE_SIZE};
