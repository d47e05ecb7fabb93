//! # Shared Bus - Observer/Subject Layer
//!
//! Every repository owns a [`Subject`]; reactive services implement
//! [`Observer`] and are attached once at startup.
//!
//! ```text
//! ┌──────────────┐  save()   ┌──────────────┐  notify()  ┌──────────────┐
//! │   Handler    │ ────────▶ │  Subject<T>  │ ─────────▶ │ Observer<T>  │
//! │              │           │  (staged)    │            │  (service)   │
//! └──────────────┘           └──────────────┘            └──────────────┘
//! ```
//!
//! ## Delivery Rules
//!
//! - A successful save stages the saved entity; `notify()` drains the staged
//!   entities and hands the same slice to every observer concurrently.
//! - Observers are level-triggered: they receive whatever changed and must
//!   ignore entities they do not care about.
//! - An observer failure is logged and counted; the remaining observers still
//!   run.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod observer;
pub mod subject;

pub use observer::{Observer, ObserverError};
pub use subject::Subject;
