//! # Service Layer

pub mod channel;
pub mod dispatcher;

pub use channel::{dispatch_channel, DispatchCommand, DispatchHandle, DispatchLoop};
pub use dispatcher::{DispatchReport, TransactionDispatcher};
