//! Mined transaction receipts.

use crate::abi::DeclaredIntent;
use alloy_primitives::B256;
use alloy_sol_types::SolEvent;
use shared_types::{Address, Hash};

/// One log emitted by a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Emitting contract.
    pub address: Address,
    /// Topic 0 is the event signature hash, then the indexed arguments.
    pub topics: Vec<Hash>,
    /// Non-indexed arguments.
    pub data: Vec<u8>,
}

impl LogEntry {
    /// Log `event` would produce when emitted by `address`.
    pub fn from_event<E: SolEvent>(address: Address, event: &E) -> Self {
        let log = event.encode_log_data();
        Self {
            address,
            topics: log.topics().iter().map(|topic| Hash::from(topic.0)).collect(),
            data: log.data.to_vec(),
        }
    }

    /// Decodes the log as `E`, `None` when the signature or layout differs.
    pub fn decode<E: SolEvent>(&self) -> Option<E> {
        let topics = self.topics.iter().map(|topic| B256::from(topic.0));
        E::decode_raw_log(topics, &self.data).ok()
    }
}

/// Receipt of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub transaction_hash: Hash,
    /// Block the transaction was mined in.
    pub block_number: Option<u64>,
    /// `true` when execution succeeded.
    pub status: bool,
    /// Emitted logs in order.
    pub logs: Vec<LogEntry>,
}

impl TransactionReceipt {
    /// Message hash of the first `E` log in the receipt.
    pub fn declared_message_hash<E: DeclaredIntent>(&self) -> Option<Hash> {
        self.logs
            .iter()
            .find_map(LogEntry::decode::<E>)
            .map(|event| event.message_hash())
    }
}
