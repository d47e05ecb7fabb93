//! # Outbound Ports

use crate::domain::{ProofData, ServiceError, StorageProof};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{keccak256, Address, BlockHeight, Hash};

/// Source of gateway account and storage proofs on one chain.
#[async_trait]
pub trait ProofGenerator: Send + Sync {
    /// Proves the account of `gateway` and each of `storage_keys` at `height`.
    async fn get_outbox_proof(
        &self,
        gateway: Address,
        storage_keys: &[Hash],
        height: BlockHeight,
    ) -> Result<ProofData, ServiceError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Deterministic proofs derived from the request.
#[derive(Default)]
pub struct MockProofGenerator {
    /// Fail every request.
    pub fail: bool,
    requests: Mutex<Vec<(Address, Vec<Hash>, BlockHeight)>>,
}

impl MockProofGenerator {
    /// Generator failing every request.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests answered so far.
    pub fn requests(&self) -> Vec<(Address, Vec<Hash>, BlockHeight)> {
        self.requests.lock().clone()
    }

    /// Number of requests answered.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Account value the mock returns for `gateway` at `height`.
    pub fn account_value(gateway: Address, height: BlockHeight) -> Vec<u8> {
        let mut preimage = gateway.as_bytes().to_vec();
        preimage.extend_from_slice(&height.to_be_bytes());
        keccak256(preimage).as_bytes().to_vec()
    }
}

#[async_trait]
impl ProofGenerator for MockProofGenerator {
    async fn get_outbox_proof(
        &self,
        gateway: Address,
        storage_keys: &[Hash],
        height: BlockHeight,
    ) -> Result<ProofData, ServiceError> {
        if self.fail {
            return Err(ServiceError::Proof("Mock failure".to_string()));
        }
        self.requests
            .lock()
            .push((gateway, storage_keys.to_vec(), height));

        Ok(ProofData {
            encoded_account_value: Self::account_value(gateway, height),
            serialized_account_proof: vec![0xc0],
            storage_proofs: storage_keys
                .iter()
                .map(|key| StorageProof {
                    key: *key,
                    serialized_proof: key.as_bytes().to_vec(),
                })
                .collect(),
        })
    }
}
