//! # Facilitator Test Suite
//!
//! Cross-crate scenarios driven through in-memory chains.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # in-memory index, store and chain mocks + event builders
//! └── integration/      # message lifecycle scenarios
//!     ├── stake_flow.rs
//!     ├── redeem_flow.rs
//!     ├── forks.rs
//!     ├── scenarios.rs
//!     ├── redelivery.rs
//!     └── runtime.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::forks
//! ```

pub mod harness;
pub mod integration;
