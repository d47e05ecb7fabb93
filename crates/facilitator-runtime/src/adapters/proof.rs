//! # Gateway Proofs over `eth_getProof`
//!
//! The node returns the account fields and every proof node as hex. The
//! gateway contracts expect RLP: the account as `[nonce, balance,
//! storageHash, codeHash]` and each proof as the RLP list of its nodes.

use super::json_rpc::{quantity, JsonRpcClient};
use async_trait::async_trait;
use fc_05_proof_services::{ProofData, ProofGenerator, ServiceError, StorageProof};
use rlp::RlpStream;
use serde::Deserialize;
use serde_json::json;
use shared_types::serde_helpers::parse_u256;
use shared_types::{Address, BlockHeight, Hash, U256};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountProofResponse {
    nonce: String,
    balance: String,
    storage_hash: Hash,
    code_hash: Hash,
    account_proof: Vec<String>,
    #[serde(default)]
    storage_proof: Vec<StorageProofResponse>,
}

#[derive(Debug, Deserialize)]
struct StorageProofResponse {
    key: String,
    proof: Vec<String>,
}

/// [`ProofGenerator`] backed by a node's `eth_getProof`.
pub struct JsonRpcProofGenerator {
    rpc: JsonRpcClient,
}

impl JsonRpcProofGenerator {
    /// Generator for the node at `rpc_url`.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc: JsonRpcClient::new(rpc_url),
        }
    }
}

fn proof_error(reason: impl ToString) -> ServiceError {
    ServiceError::Proof(reason.to_string())
}

fn hex_bytes(text: &str) -> Result<Vec<u8>, ServiceError> {
    hex::decode(text.strip_prefix("0x").unwrap_or(text)).map_err(|e| proof_error(format!("{text}: {e}")))
}

/// RLP of the account leaf value.
pub fn encode_account(nonce: U256, balance: U256, storage_hash: Hash, code_hash: Hash) -> Vec<u8> {
    let mut stream = RlpStream::new_list(4);
    stream.append(&nonce);
    stream.append(&balance);
    stream.append(&storage_hash);
    stream.append(&code_hash);
    stream.out().to_vec()
}

/// RLP list of already RLP-encoded proof nodes.
pub fn encode_proof_nodes(nodes: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(nodes.len());
    for node in nodes {
        stream.append_raw(node, 1);
    }
    stream.out().to_vec()
}

fn decode_nodes(nodes: &[String]) -> Result<Vec<Vec<u8>>, ServiceError> {
    nodes.iter().map(|node| hex_bytes(node)).collect()
}

/// Storage keys come back without leading zeros on some nodes.
fn storage_key(text: &str) -> Result<Hash, ServiceError> {
    let value = parse_u256(text).map_err(proof_error)?;
    let mut key = [0u8; 32];
    value.to_big_endian(&mut key);
    Ok(Hash::from(key))
}

impl AccountProofResponse {
    fn into_proof_data(self) -> Result<ProofData, ServiceError> {
        let nonce = parse_u256(&self.nonce).map_err(proof_error)?;
        let balance = parse_u256(&self.balance).map_err(proof_error)?;
        let storage_proofs = self
            .storage_proof
            .iter()
            .map(|entry| {
                Ok(StorageProof {
                    key: storage_key(&entry.key)?,
                    serialized_proof: encode_proof_nodes(&decode_nodes(&entry.proof)?),
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(ProofData {
            encoded_account_value: encode_account(nonce, balance, self.storage_hash, self.code_hash),
            serialized_account_proof: encode_proof_nodes(&decode_nodes(&self.account_proof)?),
            storage_proofs,
        })
    }
}

#[async_trait]
impl ProofGenerator for JsonRpcProofGenerator {
    async fn get_outbox_proof(
        &self,
        gateway: Address,
        storage_keys: &[Hash],
        height: BlockHeight,
    ) -> Result<ProofData, ServiceError> {
        let keys: Vec<String> = storage_keys.iter().map(|key| format!("{key:?}")).collect();
        let response: AccountProofResponse = self
            .rpc
            .call(
                "eth_getProof",
                json!([format!("{gateway:?}"), keys, quantity(height)]),
            )
            .await
            .map_err(proof_error)?;
        debug!(?gateway, height, keys = storage_keys.len(), "Proof fetched");
        response.into_proof_data()
    }
}
