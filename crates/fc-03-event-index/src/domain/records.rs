//! # Indexed Records
//!
//! Raw index records are JSON objects. They are decoded once, at the client
//! boundary, into [`RecordMeta`] plus a typed [`ChainEvent`]. Everything past
//! this module works on typed values only.
//!
//! Stake and redeem flavours of the same event share a record type; the
//! differing field names are accepted through serde aliases.

use super::errors::IndexError;
use fc_02_storage::EntityKind;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use shared_types::serde_helpers::{decimal_u256, decimal_u64, parse_u256};
use shared_types::{Address, BlockHeight, Hash, U256};
use std::collections::BTreeMap;

/// Fields every index record carries.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Index-assigned record id.
    pub id: String,
    /// Block the event was mined in.
    #[serde(with = "decimal_u64")]
    pub block_number: BlockHeight,
    /// Index update timestamp, the cursor dimension.
    #[serde(with = "decimal_u64")]
    pub uts: u64,
    /// Emitting contract.
    pub contract_address: Address,
}

impl RecordMeta {
    /// Reads the common fields of `raw`.
    pub fn decode(kind: EntityKind, raw: &Value) -> Result<Self, IndexError> {
        RecordMeta::deserialize(raw).map_err(|e| IndexError::Decode {
            kind,
            id: raw
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string(),
            reason: e.to_string(),
        })
    }
}

/// `StakeRequested` / `RedeemRequested` at a pool contract.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedRecord {
    /// Request hash.
    #[serde(alias = "stakeRequestHash", alias = "redeemRequestHash")]
    pub request_hash: Hash,
    /// Requested amount.
    #[serde(with = "decimal_u256")]
    pub amount: U256,
    /// Beneficiary on the target chain.
    pub beneficiary: Address,
    /// Reward gas price.
    #[serde(with = "decimal_u256")]
    pub gas_price: U256,
    /// Reward gas limit.
    #[serde(with = "decimal_u256")]
    pub gas_limit: U256,
    /// Request nonce.
    #[serde(with = "decimal_u256")]
    pub nonce: U256,
    /// Gateway or co-gateway the request targets.
    #[serde(alias = "cogateway")]
    pub gateway: Address,
    /// Staker / redeemer.
    #[serde(alias = "staker", alias = "redeemer")]
    pub sender: Address,
    /// Proxy declaring the intent.
    #[serde(alias = "stakerProxy", alias = "redeemerProxy")]
    pub sender_proxy: Address,
}

/// `StakeIntentDeclared` / `RedeemIntentDeclared` at the source gateway.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DeclaredRecord {
    /// Message hash.
    #[serde(rename = "_messageHash")]
    pub message_hash: Hash,
    /// Declaring staker / redeemer (the proxy).
    #[serde(rename = "_sender", alias = "_staker", alias = "_redeemer")]
    pub sender: Address,
    /// Sender nonce on the gateway.
    #[serde(
        rename = "_senderNonce",
        alias = "_stakerNonce",
        alias = "_redeemerNonce",
        with = "decimal_u256"
    )]
    pub nonce: U256,
    /// Beneficiary on the target chain.
    #[serde(rename = "_beneficiary")]
    pub beneficiary: Address,
    /// Declared amount.
    #[serde(rename = "_amount", with = "decimal_u256")]
    pub amount: U256,
}

/// `StakeIntentConfirmed` / `RedeemIntentConfirmed` at the target gateway.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ConfirmedRecord {
    /// Message hash.
    #[serde(rename = "_messageHash")]
    pub message_hash: Hash,
    /// Staker / redeemer.
    #[serde(rename = "_sender", alias = "_staker", alias = "_redeemer")]
    pub sender: Address,
    /// Sender nonce on the source gateway.
    #[serde(
        rename = "_senderNonce",
        alias = "_stakerNonce",
        alias = "_redeemerNonce",
        with = "decimal_u256"
    )]
    pub nonce: U256,
    /// Beneficiary.
    #[serde(rename = "_beneficiary")]
    pub beneficiary: Address,
    /// Confirmed amount.
    #[serde(rename = "_amount", with = "decimal_u256")]
    pub amount: U256,
    /// Source height the confirmation was proven against.
    #[serde(rename = "_blockHeight", with = "decimal_u64")]
    pub block_height: BlockHeight,
    /// Hash lock of the message.
    #[serde(rename = "_hashLock")]
    pub hash_lock: Hash,
}

/// Any of the four progress events.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProgressedRecord {
    /// Message hash.
    #[serde(rename = "_messageHash")]
    pub message_hash: Hash,
    /// Staker / redeemer.
    #[serde(rename = "_sender", alias = "_staker", alias = "_redeemer")]
    pub sender: Address,
    /// Sender nonce, where the event carries one.
    #[serde(
        rename = "_senderNonce",
        alias = "_stakerNonce",
        alias = "_redeemerNonce",
        default,
        deserialize_with = "optional_u256"
    )]
    pub nonce: Option<U256>,
    /// Progressed by proof instead of by secret.
    #[serde(rename = "_proofProgress", default)]
    pub proof_progress: bool,
    /// Revealed secret; zero for proof progress.
    #[serde(rename = "_unlockSecret")]
    pub unlock_secret: Hash,
}

/// `StateRootAvailable` at an anchor.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct StateRootAvailableRecord {
    /// Anchored height of the remote chain.
    #[serde(rename = "_blockHeight", with = "decimal_u64")]
    pub block_height: BlockHeight,
    /// Anchored state root.
    #[serde(rename = "_stateRoot")]
    pub state_root: Hash,
}

/// `GatewayProven` at a gateway or co-gateway.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GatewayProvenRecord {
    /// Remote gateway that was proven.
    #[serde(rename = "_gateway")]
    pub remote_gateway: Address,
    /// Remote height of the proof.
    #[serde(rename = "_blockHeight", with = "decimal_u64")]
    pub block_height: BlockHeight,
    /// Proven storage root.
    #[serde(rename = "_storageRoot")]
    pub storage_root: Hash,
    /// The height had already been proven.
    #[serde(rename = "_wasAlreadyProved", default)]
    pub was_already_proved: bool,
}

fn optional_u256<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(U256::from(n))),
        Some(Raw::Text(s)) => parse_u256(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A decoded index event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainEvent {
    /// Stake pool request.
    StakeRequested(RequestedRecord),
    /// Redeem pool request.
    RedeemRequested(RequestedRecord),
    /// Stake intent declared on origin.
    StakeIntentDeclared(DeclaredRecord),
    /// Redeem intent declared on auxiliary.
    RedeemIntentDeclared(DeclaredRecord),
    /// Stake intent confirmed on auxiliary.
    StakeIntentConfirmed(ConfirmedRecord),
    /// Redeem intent confirmed on origin.
    RedeemIntentConfirmed(ConfirmedRecord),
    /// Stake progressed on origin.
    StakeProgressed(ProgressedRecord),
    /// Mint progressed on auxiliary.
    MintProgressed(ProgressedRecord),
    /// Redeem progressed on auxiliary.
    RedeemProgressed(ProgressedRecord),
    /// Unstake progressed on origin.
    UnstakeProgressed(ProgressedRecord),
    /// State root anchored.
    StateRootAvailable(StateRootAvailableRecord),
    /// Remote gateway proven.
    GatewayProven(GatewayProvenRecord),
}

impl ChainEvent {
    /// Decodes the event part of a `kind` record.
    pub fn decode(kind: EntityKind, raw: &Value) -> Result<Self, serde_json::Error> {
        use EntityKind as K;
        Ok(match kind {
            K::StakeRequested => Self::StakeRequested(RequestedRecord::deserialize(raw)?),
            K::RedeemRequested => Self::RedeemRequested(RequestedRecord::deserialize(raw)?),
            K::StakeIntentDeclared => Self::StakeIntentDeclared(DeclaredRecord::deserialize(raw)?),
            K::RedeemIntentDeclared => {
                Self::RedeemIntentDeclared(DeclaredRecord::deserialize(raw)?)
            }
            K::StakeIntentConfirmed => {
                Self::StakeIntentConfirmed(ConfirmedRecord::deserialize(raw)?)
            }
            K::RedeemIntentConfirmed => {
                Self::RedeemIntentConfirmed(ConfirmedRecord::deserialize(raw)?)
            }
            K::StakeProgressed => Self::StakeProgressed(ProgressedRecord::deserialize(raw)?),
            K::MintProgressed => Self::MintProgressed(ProgressedRecord::deserialize(raw)?),
            K::RedeemProgressed => Self::RedeemProgressed(ProgressedRecord::deserialize(raw)?),
            K::UnstakeProgressed => Self::UnstakeProgressed(ProgressedRecord::deserialize(raw)?),
            K::StateRootAvailable => {
                Self::StateRootAvailable(StateRootAvailableRecord::deserialize(raw)?)
            }
            K::GatewayProven => Self::GatewayProven(GatewayProvenRecord::deserialize(raw)?),
        })
    }

    /// Kind this event was decoded as.
    pub fn kind(&self) -> EntityKind {
        use EntityKind as K;
        match self {
            Self::StakeRequested(_) => K::StakeRequested,
            Self::RedeemRequested(_) => K::RedeemRequested,
            Self::StakeIntentDeclared(_) => K::StakeIntentDeclared,
            Self::RedeemIntentDeclared(_) => K::RedeemIntentDeclared,
            Self::StakeIntentConfirmed(_) => K::StakeIntentConfirmed,
            Self::RedeemIntentConfirmed(_) => K::RedeemIntentConfirmed,
            Self::StakeProgressed(_) => K::StakeProgressed,
            Self::MintProgressed(_) => K::MintProgressed,
            Self::RedeemProgressed(_) => K::RedeemProgressed,
            Self::UnstakeProgressed(_) => K::UnstakeProgressed,
            Self::StateRootAvailable(_) => K::StateRootAvailable,
            Self::GatewayProven(_) => K::GatewayProven,
        }
    }
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedRecord {
    /// Common fields.
    pub meta: RecordMeta,
    /// Typed payload.
    pub event: ChainEvent,
}

impl IndexedRecord {
    /// Decodes a full raw record of `kind`.
    pub fn decode(kind: EntityKind, raw: &Value) -> Result<Self, IndexError> {
        let meta = RecordMeta::decode(kind, raw)?;
        let event = ChainEvent::decode(kind, raw).map_err(|e| IndexError::Decode {
            kind,
            id: meta.id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { meta, event })
    }
}

/// Records of one delivery, grouped by kind, each group in index order.
pub type EventBatch = BTreeMap<EntityKind, Vec<IndexedRecord>>;

/// GraphQL selection set for `kind`.
pub fn selection(kind: EntityKind) -> &'static str {
    use EntityKind as K;
    match kind {
        K::StakeRequested => {
            "id blockNumber uts contractAddress stakeRequestHash amount beneficiary gasPrice \
             gasLimit nonce gateway staker stakerProxy"
        }
        K::RedeemRequested => {
            "id blockNumber uts contractAddress redeemRequestHash amount beneficiary gasPrice \
             gasLimit nonce cogateway redeemer redeemerProxy"
        }
        K::StakeIntentDeclared => {
            "id blockNumber uts contractAddress _messageHash _staker _stakerNonce _beneficiary _amount"
        }
        K::RedeemIntentDeclared => {
            "id blockNumber uts contractAddress _messageHash _redeemer _redeemerNonce _beneficiary _amount"
        }
        K::StakeIntentConfirmed => {
            "id blockNumber uts contractAddress _messageHash _staker _stakerNonce _beneficiary \
             _amount _blockHeight _hashLock"
        }
        K::RedeemIntentConfirmed => {
            "id blockNumber uts contractAddress _messageHash _redeemer _redeemerNonce _beneficiary \
             _amount _blockHeight _hashLock"
        }
        K::StakeProgressed => {
            "id blockNumber uts contractAddress _messageHash _staker _stakerNonce _proofProgress \
             _unlockSecret"
        }
        K::MintProgressed => {
            "id blockNumber uts contractAddress _messageHash _staker _proofProgress _unlockSecret"
        }
        K::RedeemProgressed => {
            "id blockNumber uts contractAddress _messageHash _redeemer _redeemerNonce \
             _proofProgress _unlockSecret"
        }
        K::UnstakeProgressed => {
            "id blockNumber uts contractAddress _messageHash _redeemer _proofProgress _unlockSecret"
        }
        K::StateRootAvailable => "id blockNumber uts contractAddress _blockHeight _stateRoot",
        K::GatewayProven => {
            "id blockNumber uts contractAddress _gateway _blockHeight _storageRoot _wasAlreadyProved"
        }
    }
}
