//! # Domain Entities
//!
//! Rows owned by the repositories. Callers work on copies and hand them back
//! to `save`.

use super::errors::StorageError;
use super::value_objects::{
    AnchorRole, EntityKind, GatewayType, MessageDirection, MessageStatus, MessageType,
};
use serde::{Deserialize, Serialize};
use shared_types::{keccak256, Address, BlockHeight, ChainId, Hash, U256};

// =============================================================================
// MESSAGE
// =============================================================================

/// A cross-chain message and the status of both of its sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Primary key.
    pub message_hash: Hash,
    /// Stake or redeem.
    pub message_type: MessageType,
    /// Always `message_type.direction()`.
    pub direction: MessageDirection,
    /// Gateway on the source chain.
    pub gateway_address: Address,
    /// Declaring staker / redeemer (proxy).
    pub sender: Address,
    /// Nonce of the sender on the source gateway.
    pub nonce: U256,
    /// Reward gas price.
    pub gas_price: U256,
    /// Reward gas limit.
    pub gas_limit: U256,
    /// Status on the source chain.
    pub source_status: MessageStatus,
    /// Status on the target chain.
    pub target_status: MessageStatus,
    /// Block in which the source declaration was mined.
    pub source_declaration_block_height: Option<BlockHeight>,
    /// Unlock secret, once known.
    pub secret: Option<Hash>,
    /// keccak256 of the secret.
    pub hash_lock: Option<Hash>,
}

impl Message {
    /// A message nobody has declared yet.
    pub fn new(
        message_hash: Hash,
        message_type: MessageType,
        gateway_address: Address,
        sender: Address,
        nonce: U256,
    ) -> Self {
        Self {
            message_hash,
            message_type,
            direction: message_type.direction(),
            gateway_address,
            sender,
            nonce,
            gas_price: U256::zero(),
            gas_limit: U256::zero(),
            source_status: MessageStatus::Undeclared,
            target_status: MessageStatus::Undeclared,
            source_declaration_block_height: None,
            secret: None,
            hash_lock: None,
        }
    }

    /// Records a source declaration mined at `block_height`.
    ///
    /// A repeat at a strictly higher block moves the height forward (the
    /// declaration was re-mined after a reorg). Returns whether anything changed.
    pub fn declare_source(&mut self, block_height: BlockHeight) -> bool {
        let mut changed = false;
        if self.source_status.can_transition_to(MessageStatus::Declared) {
            self.source_status = MessageStatus::Declared;
            changed = true;
        }
        let newer = self
            .source_declaration_block_height
            .map_or(true, |known| block_height > known);
        if newer && self.source_status == MessageStatus::Declared {
            self.source_declaration_block_height = Some(block_height);
            changed = true;
        }
        if self.source_declaration_block_height.is_none() {
            self.source_declaration_block_height = Some(block_height);
            changed = true;
        }
        changed
    }

    /// Records the confirmation on the target chain.
    pub fn declare_target(&mut self) -> bool {
        let next = self.target_status.advance(MessageStatus::Declared);
        let changed = next != self.target_status;
        self.target_status = next;
        changed
    }

    /// Marks the source side progressed.
    pub fn progress_source(&mut self) -> bool {
        let changed = self.source_status != MessageStatus::Progressed;
        self.source_status = MessageStatus::Progressed;
        changed
    }

    /// Marks the target side progressed.
    pub fn progress_target(&mut self) -> bool {
        let changed = self.target_status != MessageStatus::Progressed;
        self.target_status = MessageStatus::Progressed;
        changed
    }

    /// Stores `secret` unless it contradicts a known hash lock.
    ///
    /// Returns `false` when the secret was rejected.
    pub fn record_secret(&mut self, secret: Hash) -> bool {
        if let Some(hash_lock) = self.hash_lock {
            if keccak256(secret.as_bytes()) != hash_lock {
                return false;
            }
        }
        self.secret = Some(secret);
        true
    }

    /// Stores `hash_lock` if none is known yet.
    pub fn record_hash_lock(&mut self, hash_lock: Hash) {
        if self.hash_lock.is_none() {
            self.hash_lock = Some(hash_lock);
        }
    }

    /// Declared on the source, not yet confirmed on the target, and declared
    /// at or below `height`.
    pub fn awaits_confirmation_at(&self, height: BlockHeight) -> bool {
        self.source_status == MessageStatus::Declared
            && self.target_status == MessageStatus::Undeclared
            && self
                .source_declaration_block_height
                .is_some_and(|declared| declared <= height)
    }

    /// Checks the row before it is written.
    pub fn validate(&self) -> Result<(), StorageError> {
        let key = format!("{:?}", self.message_hash);
        if self.direction != self.message_type.direction() {
            return Err(StorageError::invalid(
                "message",
                key,
                "direction does not match message type",
            ));
        }
        if self.source_status == MessageStatus::Declared
            && self.source_declaration_block_height.is_none()
        {
            return Err(StorageError::invalid(
                "message",
                key,
                "declared source without declaration height",
            ));
        }
        if let (Some(secret), Some(hash_lock)) = (self.secret, self.hash_lock) {
            if !secret.is_zero() && keccak256(secret.as_bytes()) != hash_lock {
                return Err(StorageError::invalid(
                    "message",
                    key,
                    "secret does not match hash lock",
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Outcome of folding an incoming request sighting into the stored row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sighting {
    /// Sighting at a higher block: payload replaced, link reset.
    Forked,
    /// Sighting at the same or a lower block: nothing changed.
    Stale,
}

/// A stake or redeem request opened at a pool contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Primary key.
    pub request_hash: Hash,
    /// Stake or redeem.
    pub request_type: MessageType,
    /// Requested amount.
    pub amount: U256,
    /// Beneficiary on the target chain.
    pub beneficiary: Address,
    /// Reward gas price.
    pub gas_price: U256,
    /// Reward gas limit.
    pub gas_limit: U256,
    /// Request nonce.
    pub nonce: U256,
    /// Gateway (stake) or co-gateway (redeem).
    pub gateway_address: Address,
    /// Staker / redeemer.
    pub sender: Address,
    /// Proxy that declares the intent on the sender's behalf.
    pub sender_proxy: Address,
    /// Block the request event was mined in.
    pub block_number: BlockHeight,
    /// Message the request turned into, once known.
    pub message_hash: Option<Hash>,
}

impl Request {
    /// Folds a later sighting of the same request hash into `self`.
    ///
    /// A sighting from a strictly higher block means the earlier block was
    /// reorganized away: the payload of the new sighting wins and the message
    /// link is cleared so it can be re-derived.
    pub fn absorb(&mut self, sighting: Request) -> Sighting {
        if sighting.block_number > self.block_number {
            *self = Request {
                message_hash: None,
                ..sighting
            };
            Sighting::Forked
        } else {
            Sighting::Stale
        }
    }

    /// Whether `other` carries the same payload (ignoring block and link).
    pub fn same_payload(&self, other: &Request) -> bool {
        self.request_type == other.request_type
            && self.amount == other.amount
            && self.beneficiary == other.beneficiary
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.nonce == other.nonce
            && self.gateway_address == other.gateway_address
            && self.sender == other.sender
            && self.sender_proxy == other.sender_proxy
    }

    /// Checks the row before it is written.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.amount.is_zero() {
            return Err(StorageError::invalid(
                "request",
                format!("{:?}", self.request_hash),
                "amount is zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// CONTRACT ENTITY (CURSOR)
// =============================================================================

/// Highest index timestamp consumed for one (contract, kind) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntity {
    /// Emitting contract.
    pub contract_address: Address,
    /// Event kind.
    pub entity_kind: EntityKind,
    /// Last consumed `uts`.
    pub timestamp: u64,
}

impl ContractEntity {
    /// Moves the cursor to `uts` if that is later. Returns whether it moved.
    pub fn advance(&mut self, uts: u64) -> bool {
        if uts > self.timestamp {
            self.timestamp = uts;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// AUXILIARY CHAIN
// =============================================================================

/// A configured auxiliary chain and the latest anchored heights.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryChain {
    /// Primary key.
    pub chain_id: ChainId,
    /// Display name of the origin chain.
    pub origin_chain_name: String,
    /// EIP20 gateway on origin.
    pub origin_gateway_address: Address,
    /// Co-gateway on auxiliary.
    pub auxiliary_gateway_address: Address,
    /// Anchor on origin storing auxiliary state roots.
    pub origin_anchor_address: Address,
    /// Anchor on auxiliary storing origin state roots.
    pub auxiliary_anchor_address: Address,
    /// Latest origin height anchored on auxiliary.
    pub last_origin_block_height: Option<BlockHeight>,
    /// Latest auxiliary height anchored on origin.
    pub last_auxiliary_block_height: Option<BlockHeight>,
}

impl AuxiliaryChain {
    /// Records an anchored origin height; keeps the maximum.
    pub fn record_origin_height(&mut self, height: BlockHeight) -> bool {
        raise(&mut self.last_origin_block_height, height)
    }

    /// Records an anchored auxiliary height; keeps the maximum.
    pub fn record_auxiliary_height(&mut self, height: BlockHeight) -> bool {
        raise(&mut self.last_auxiliary_block_height, height)
    }

    /// Which anchor `address` is for this chain, if any.
    pub fn anchor_role(&self, address: Address) -> Option<AnchorRole> {
        if address == self.auxiliary_anchor_address {
            Some(AnchorRole::OriginRoots)
        } else if address == self.origin_anchor_address {
            Some(AnchorRole::AuxiliaryRoots)
        } else {
            None
        }
    }
}

// =============================================================================
// GATEWAY
// =============================================================================

/// Static metadata of a gateway plus its proven height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gateway {
    /// Primary key.
    pub gateway_address: Address,
    /// Auxiliary chain id this gateway pair serves.
    pub chain_id: ChainId,
    /// Origin gateway or auxiliary co-gateway.
    pub gateway_type: GatewayType,
    /// Gateway on the other chain.
    pub remote_gateway_address: Address,
    /// Token moved by the gateway.
    pub token_address: Address,
    /// Anchor holding the remote chain's state roots.
    pub anchor_address: Address,
    /// Bounty required to declare an intent.
    pub bounty: U256,
    /// Whether the gateway is active.
    pub activation: bool,
    /// Latest remote height at which the remote gateway was proven here.
    pub last_remote_gateway_proven_block_height: Option<BlockHeight>,
}

impl Gateway {
    /// Records a proven remote height; keeps the maximum.
    pub fn record_proven_height(&mut self, height: BlockHeight) -> bool {
        raise(&mut self.last_remote_gateway_proven_block_height, height)
    }

    /// Checks the row before it is written.
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.gateway_address == self.remote_gateway_address {
            return Err(StorageError::invalid(
                "gateway",
                format!("{:?}", self.gateway_address),
                "remote gateway equals gateway",
            ));
        }
        Ok(())
    }
}

fn raise(slot: &mut Option<BlockHeight>, height: BlockHeight) -> bool {
    match *slot {
        Some(current) if current >= height => false,
        _ => {
            *slot = Some(height);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message::new(
            Hash::repeat_byte(1),
            MessageType::Stake,
            Address::repeat_byte(2),
            Address::repeat_byte(3),
            U256::one(),
        )
    }

    fn request(block_number: u64) -> Request {
        Request {
            request_hash: Hash::repeat_byte(9),
            request_type: MessageType::Stake,
            amount: U256::from(100),
            beneficiary: Address::repeat_byte(4),
            gas_price: U256::one(),
            gas_limit: U256::one(),
            nonce: U256::one(),
            gateway_address: Address::repeat_byte(2),
            sender: Address::repeat_byte(5),
            sender_proxy: Address::repeat_byte(6),
            block_number,
            message_hash: None,
        }
    }

    #[test]
    fn test_declare_source_sets_status_and_height() {
        let mut m = message();
        assert!(m.declare_source(10));
        assert_eq!(m.source_status, MessageStatus::Declared);
        assert_eq!(m.source_declaration_block_height, Some(10));
        assert!(!m.declare_source(10));
        assert!(!m.declare_source(8));
        assert!(m.declare_source(12));
        assert_eq!(m.source_declaration_block_height, Some(12));
    }

    #[test]
    fn test_declare_after_progress_keeps_status() {
        let mut m = message();
        m.progress_source();
        m.declare_source(10);
        assert_eq!(m.source_status, MessageStatus::Progressed);
        assert_eq!(m.source_declaration_block_height, Some(10));
    }

    #[test]
    fn test_progress_is_idempotent() {
        let mut m = message();
        assert!(m.progress_target());
        assert!(!m.progress_target());
        assert!(!m.declare_target());
        assert_eq!(m.target_status, MessageStatus::Progressed);
    }

    #[test]
    fn test_record_secret_checks_hash_lock() {
        let secret = Hash::repeat_byte(0x5e);
        let mut m = message();
        m.record_hash_lock(keccak256(secret.as_bytes()));
        assert!(!m.record_secret(Hash::repeat_byte(0x01)));
        assert_eq!(m.secret, None);
        assert!(m.record_secret(secret));
        assert_eq!(m.secret, Some(secret));
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_declared_without_height() {
        let mut m = message();
        m.source_status = MessageStatus::Declared;
        assert!(matches!(
            m.validate(),
            Err(StorageError::Validation { entity: "message", .. })
        ));
    }

    #[test]
    fn test_awaits_confirmation() {
        let mut m = message();
        assert!(!m.awaits_confirmation_at(100));
        m.declare_source(90);
        assert!(m.awaits_confirmation_at(100));
        assert!(m.awaits_confirmation_at(90));
        assert!(!m.awaits_confirmation_at(89));
        m.declare_target();
        assert!(!m.awaits_confirmation_at(100));
    }

    #[test]
    fn test_request_fork_resets_link() {
        let mut stored = request(10);
        stored.message_hash = Some(Hash::repeat_byte(0xaa));

        let mut forked = request(11);
        forked.amount = U256::from(150);
        assert_eq!(stored.absorb(forked), Sighting::Forked);
        assert_eq!(stored.block_number, 11);
        assert_eq!(stored.amount, U256::from(150));
        assert_eq!(stored.message_hash, None);
    }

    #[test]
    fn test_request_stale_sighting_is_ignored() {
        let mut stored = request(10);
        stored.message_hash = Some(Hash::repeat_byte(0xaa));
        assert_eq!(stored.absorb(request(10)), Sighting::Stale);
        assert_eq!(stored.absorb(request(9)), Sighting::Stale);
        assert_eq!(stored.message_hash, Some(Hash::repeat_byte(0xaa)));
    }

    #[test]
    fn test_cursor_only_moves_forward() {
        let mut cursor = ContractEntity {
            contract_address: Address::repeat_byte(1),
            entity_kind: EntityKind::StakeRequested,
            timestamp: 10,
        };
        assert!(!cursor.advance(5));
        assert!(cursor.advance(11));
        assert_eq!(cursor.timestamp, 11);
    }

    #[test]
    fn test_anchor_heights_are_monotonic() {
        let mut chain = AuxiliaryChain {
            chain_id: 1405,
            origin_chain_name: "ropsten".to_string(),
            origin_gateway_address: Address::repeat_byte(1),
            auxiliary_gateway_address: Address::repeat_byte(2),
            origin_anchor_address: Address::repeat_byte(3),
            auxiliary_anchor_address: Address::repeat_byte(4),
            last_origin_block_height: None,
            last_auxiliary_block_height: None,
        };
        assert!(chain.record_origin_height(100));
        assert!(!chain.record_origin_height(99));
        assert_eq!(chain.last_origin_block_height, Some(100));
        assert_eq!(
            chain.anchor_role(Address::repeat_byte(4)),
            Some(AnchorRole::OriginRoots)
        );
        assert_eq!(chain.anchor_role(Address::repeat_byte(9)), None);
    }
}
