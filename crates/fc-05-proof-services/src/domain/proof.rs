//! # Proofs and Outcomes

use shared_types::{keccak256, BlockHeight, Hash, U256};

/// Storage slot of the gateway's message outbox mapping.
pub const MESSAGE_OUTBOX_SLOT: u64 = 7;

/// Merkle-Patricia proof of one storage slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageProof {
    /// Proven storage key.
    pub key: Hash,
    /// RLP list of the proof nodes.
    pub serialized_proof: Vec<u8>,
}

/// Account proof of a gateway plus the requested storage proofs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProofData {
    /// RLP of `[nonce, balance, storageRoot, codeHash]`.
    pub encoded_account_value: Vec<u8>,
    /// RLP list of the account proof nodes.
    pub serialized_account_proof: Vec<u8>,
    /// One entry per requested storage key, in request order.
    pub storage_proofs: Vec<StorageProof>,
}

/// What a reaction did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReactOutcome {
    /// No message is waiting for this service.
    NothingPending,
    /// The target already knows this height; nothing was sent.
    AlreadyProven {
        /// Height that was already proven.
        height: BlockHeight,
    },
    /// Transactions were mined.
    Submitted {
        /// Hashes of the mined transactions.
        transaction_hashes: Vec<Hash>,
    },
}

impl ReactOutcome {
    /// Number of transactions sent.
    pub fn submissions(&self) -> usize {
        match self {
            Self::Submitted { transaction_hashes } => transaction_hashes.len(),
            _ => 0,
        }
    }

    /// `Submitted` for a non-empty list, `NothingPending` otherwise.
    pub fn from_hashes(transaction_hashes: Vec<Hash>) -> Self {
        if transaction_hashes.is_empty() {
            Self::NothingPending
        } else {
            Self::Submitted { transaction_hashes }
        }
    }
}

/// Storage key of `message_hash` in the gateway outbox:
/// `keccak256(message_hash ++ uint256(MESSAGE_OUTBOX_SLOT))`.
pub fn outbox_storage_key(message_hash: &Hash) -> Hash {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(message_hash.as_bytes());
    U256::from(MESSAGE_OUTBOX_SLOT).to_big_endian(&mut preimage[32..]);
    keccak256(preimage)
}
