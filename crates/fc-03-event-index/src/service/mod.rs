//! # Services
//!
//! Sweeps (fetch, deliver, commit) and the per-side subscription lifecycle.

pub mod fetcher;
pub mod subscriber;

pub use fetcher::{Sweep, TransactionFetcher, DEFAULT_PAGE_SIZE};
pub use subscriber::{Subscriber, SubscriptionTarget};
