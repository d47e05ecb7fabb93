//! Message lifecycle scenarios.

pub mod forks;
pub mod redeem_flow;
pub mod redelivery;
pub mod runtime;
pub mod scenarios;
pub mod stake_flow;
