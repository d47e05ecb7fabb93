//! # FC-04 Transaction Dispatcher
//!
//! Applies decoded index batches to the repositories.
//!
//! ## Flow
//!
//! ```text
//! Subscriber ──► DispatchHandle ──► DispatchLoop (one batch at a time)
//!                                        │
//!                                        ▼
//!                         TransactionDispatcher::dispatch
//!                           ├── handler per kind (concurrent)
//!                           └── Repositories::notify (observers)
//! ```
//!
//! Handlers tolerate forks and replays. A record seen twice writes nothing
//! the second time; a block reorganization may move a request to a later
//! block but never back; message statuses never regress.
//!
//! ## Module Structure
//!
//! ```text
//! fc-04-dispatcher/
//! ├── domain/     # HandlerError, DispatchError
//! ├── ports/      # ContractEntityHandler
//! ├── handlers/   # one handler per indexed kind
//! └── service/    # TransactionDispatcher, dispatch channel
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

pub use domain::{DispatchError, HandlerError};
pub use handlers::{
    standard_handlers, GatewayProvenHandler, IntentConfirmedHandler, IntentDeclaredHandler,
    ProgressSide, ProgressedHandler, RequestedHandler, StateRootAvailableHandler,
};
pub use ports::ContractEntityHandler;
pub use service::{
    dispatch_channel, DispatchCommand, DispatchHandle, DispatchLoop, DispatchReport,
    TransactionDispatcher,
};
