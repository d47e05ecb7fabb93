//! # JSON-RPC Chain Client
//!
//! Talks to an Ethereum-compatible node over HTTP JSON-RPC. The facilitator
//! account must be held by the node's keystore: transactions are signed by
//! the node through `eth_sendTransaction`.
//!
//! | Port | Method |
//! |------|--------|
//! | `NonceSource` | `eth_getTransactionCount(address, "pending")` |
//! | `KeyVault` | `personal_unlockAccount(address, password, 0)` |
//! | `ChainClient` | `eth_sendTransaction`, then `eth_getTransactionReceipt` until mined |

use async_trait::async_trait;
use fc_01_account::{
    AccountError, ChainClient, ContractCall, KeyVault, LogEntry, NonceSource, TransactionReceipt,
    TxOptions,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::serde_helpers::parse_u64;
use shared_types::{Address, Hash, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

const HTTP_TIMEOUT_SECS: u64 = 30;
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure. A `null` result and a missing one look the
/// same here; callers that expect `null` deserialize into an `Option`.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Transport and protocol failures.
#[derive(Debug, Error)]
pub enum RpcError {
    /// HTTP failure.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error.
    #[error("rpc error {code}: {message}")]
    Remote {
        /// Error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The result did not have the expected shape.
    #[error("unexpected result of {method}: {reason}")]
    Decode {
        /// Called method.
        method: String,
        /// Decoding error.
        reason: String,
    },
}

impl From<RpcError> for AccountError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Decode { .. } => AccountError::Decode(e.to_string()),
            other => AccountError::Rpc(other.to_string()),
        }
    }
}

/// Plain JSON-RPC client.
pub struct JsonRpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Creates a client for the node at `rpc_url`.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
        }
    }

    /// Node URL.
    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Makes a JSON-RPC call.
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response: JsonRpcResponse = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        serde_json::from_value(response.result.unwrap_or(Value::Null)).map_err(|e| {
            RpcError::Decode {
                method: method.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: Hash,
    #[serde(default)]
    block_number: Option<String>,
    /// Absent before Byzantium; such receipts count as successful.
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

#[derive(Debug, Deserialize)]
struct RpcLog {
    address: Address,
    #[serde(default)]
    topics: Vec<Hash>,
    #[serde(default)]
    data: String,
}

impl RpcReceipt {
    fn into_receipt(self) -> Result<TransactionReceipt, AccountError> {
        let block_number = self
            .block_number
            .as_deref()
            .map(parse_u64)
            .transpose()
            .map_err(|e| AccountError::Decode(format!("blockNumber: {e}")))?;
        let status = match self.status.as_deref() {
            None => true,
            Some(status) => {
                parse_u64(status).map_err(|e| AccountError::Decode(format!("status: {e}")))? == 1
            }
        };
        let logs = self
            .logs
            .into_iter()
            .map(|log| {
                Ok(LogEntry {
                    address: log.address,
                    topics: log.topics,
                    data: decode_hex(&log.data)?,
                })
            })
            .collect::<Result<Vec<_>, AccountError>>()?;

        Ok(TransactionReceipt {
            transaction_hash: self.transaction_hash,
            block_number,
            status,
            logs,
        })
    }
}

/// `0x`-prefixed hex quantity.
pub fn quantity(value: impl Into<U256>) -> String {
    format!("{:#x}", value.into())
}

/// `0x`-prefixed hex data.
pub fn hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes `0x`-prefixed (or bare) hex data.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, AccountError> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| AccountError::Decode(format!("{text}: {e}")))
}

/// Transaction object for `eth_sendTransaction`.
pub fn transaction_object(call: &ContractCall, options: &TxOptions) -> Value {
    json!({
        "from": format!("{:?}", options.from),
        "to": format!("{:?}", call.to),
        "data": hex_data(&call.call.encode()),
        "gas": quantity(options.gas),
        "gasPrice": quantity(options.gas_price),
        "nonce": quantity(options.nonce),
        "value": quantity(options.value),
    })
}

/// All three account ports over one node connection.
pub struct JsonRpcChainClient {
    rpc: JsonRpcClient,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl JsonRpcChainClient {
    /// Client for the node at `rpc_url`.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc: JsonRpcClient::new(rpc_url),
            poll_interval: RECEIPT_POLL_INTERVAL,
            receipt_timeout: RECEIPT_TIMEOUT,
        }
    }

    /// Overrides how receipts are awaited.
    pub fn with_receipt_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.receipt_timeout = timeout;
        self
    }

    async fn wait_for_receipt(&self, tx_hash: Hash) -> Result<TransactionReceipt, AccountError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            let receipt: Option<RpcReceipt> = self
                .rpc
                .call("eth_getTransactionReceipt", json!([format!("{tx_hash:?}")]))
                .await?;
            if let Some(receipt) = receipt {
                return receipt.into_receipt();
            }
            if Instant::now() >= deadline {
                return Err(AccountError::ReceiptTimeout(tx_hash));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl NonceSource for JsonRpcChainClient {
    async fn pending_transaction_count(&self, address: Address) -> Result<u64, AccountError> {
        let count: String = self
            .rpc
            .call(
                "eth_getTransactionCount",
                json!([format!("{address:?}"), "pending"]),
            )
            .await?;
        parse_u64(&count).map_err(|e| AccountError::Decode(format!("transaction count: {e}")))
    }
}

#[async_trait]
impl KeyVault for JsonRpcChainClient {
    async fn unlock(&self, address: Address, password: &str) -> Result<bool, AccountError> {
        // Duration 0 keeps the account unlocked while the node runs.
        let unlocked: bool = self
            .rpc
            .call(
                "personal_unlockAccount",
                json!([format!("{address:?}"), password, 0]),
            )
            .await?;
        Ok(unlocked)
    }
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn send_transaction(
        &self,
        call: &ContractCall,
        options: &TxOptions,
    ) -> Result<TransactionReceipt, AccountError> {
        let tx_hash: Hash = self
            .rpc
            .call("eth_sendTransaction", json!([transaction_object(call, options)]))
            .await?;
        debug!(url = self.rpc.url(), ?tx_hash, method = call.call.name(), "Transaction sent");
        self.wait_for_receipt(tx_hash).await
    }
}
