//! # FC-05 Proof & Submission Services
//!
//! Observers that move messages through their lifecycle.
//!
//! ## Lifecycle
//!
//! ```text
//! Request saved ──► AcceptRequestService ──► accept*Request (source pool)
//!                                                   │ index: *IntentDeclared
//! StateRootAvailable ──► ProveGatewayService ──► proveGateway (target gateway)
//!                                                   │ index: GatewayProven
//! Gateway proven ──► ConfirmIntentService ──► confirm*Intent (target gateway)
//!                                                   │ index: *IntentConfirmed
//! Message saved ──► ProgressService ──► progress* (both gateways)
//! ```
//!
//! Services never write statuses. Each transaction comes back through the
//! event index and the dispatcher, which is the only writer of lifecycle
//! state. In-flight sets keep a service from re-submitting while the
//! confirming event is on its way.
//!
//! ## Module Structure
//!
//! ```text
//! fc-05-proof-services/
//! ├── domain/     # ProofData, ReactOutcome, ServiceError
//! ├── ports/      # ProofGenerator (+ mock)
//! └── service/    # the four services
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    outbox_storage_key, ProofData, ReactOutcome, ServiceError, StorageProof, MESSAGE_OUTBOX_SLOT,
};
pub use ports::{MockProofGenerator, ProofGenerator};
pub use service::{
    generate_secret, AcceptRequestService, ConfirmIntentService, InFlight, ProgressService,
    ProgressStep, ProveGatewayService,
};
