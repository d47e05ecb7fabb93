//! # Contract Entity Handlers
//!
//! One handler per indexed kind. All of them are replay-safe: statuses and
//! heights only move forward, and a record that changes nothing writes
//! nothing.
//!
//! Lock order for read-modify-write: message stripe, then the link stripe of
//! (proxy, nonce), then request stripe.

mod confirmed;
mod declared;
mod gateway_proven;
mod progressed;
mod requested;
mod state_root;

pub use confirmed::IntentConfirmedHandler;
pub use declared::IntentDeclaredHandler;
pub use gateway_proven::GatewayProvenHandler;
pub use progressed::{ProgressSide, ProgressedHandler};
pub use requested::RequestedHandler;
pub use state_root::StateRootAvailableHandler;

use crate::domain::HandlerError;
use crate::ports::ContractEntityHandler;
use fc_02_storage::{EntityKind, MessageType, Repositories, StorageError};
use fc_03_event_index::ChainEvent;
use std::sync::Arc;
use tracing::warn;

/// Handlers for all twelve kinds.
pub fn standard_handlers(repositories: Arc<Repositories>) -> Vec<Arc<dyn ContractEntityHandler>> {
    let mut handlers: Vec<Arc<dyn ContractEntityHandler>> = Vec::with_capacity(12);
    for message_type in [MessageType::Stake, MessageType::Redeem] {
        handlers.push(Arc::new(RequestedHandler::new(message_type, repositories.clone())));
        handlers.push(Arc::new(IntentDeclaredHandler::new(message_type, repositories.clone())));
        handlers.push(Arc::new(IntentConfirmedHandler::new(message_type, repositories.clone())));
    }
    for kind in [
        EntityKind::StakeProgressed,
        EntityKind::MintProgressed,
        EntityKind::RedeemProgressed,
        EntityKind::UnstakeProgressed,
    ] {
        if let Some(handler) = ProgressedHandler::new(kind, repositories.clone()) {
            handlers.push(Arc::new(handler));
        }
    }
    handlers.push(Arc::new(StateRootAvailableHandler::new(repositories.clone())));
    handlers.push(Arc::new(GatewayProvenHandler::new(repositories)));
    handlers
}

/// Maps a save result to "written?". Rows rejected by validation are logged
/// and skipped: re-fetching cannot make them valid.
fn applied<T>(result: Result<T, StorageError>, kind: EntityKind, id: &str) -> Result<bool, HandlerError> {
    match result {
        Ok(_) => Ok(true),
        Err(StorageError::Validation { entity, key, reason }) => {
            warn!(%kind, id, entity, %key, %reason, "Record rejected by validation");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn unexpected(handler: &'static str, event: &ChainEvent) -> HandlerError {
    HandlerError::UnexpectedEvent {
        handler,
        kind: event.kind(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Record builders and a seeded repository set.

    use fc_02_storage::{AuxiliaryChain, EntityKind, Gateway, GatewayType, MessageType, Repositories};
    use fc_03_event_index::{
        ChainEvent, ConfirmedRecord, DeclaredRecord, GatewayProvenRecord, IndexedRecord,
        ProgressedRecord, RecordMeta, RequestedRecord, StateRootAvailableRecord,
    };
    use shared_types::{Address, ChainId, Hash, U256};
    use std::sync::Arc;

    pub const CHAIN_ID: ChainId = 1405;
    pub const ORIGIN_GATEWAY: Address = Address::repeat_byte(0x0a);
    pub const CO_GATEWAY: Address = Address::repeat_byte(0x0b);
    pub const STAKE_POOL: Address = Address::repeat_byte(0x0c);
    pub const REDEEM_POOL: Address = Address::repeat_byte(0x0d);
    pub const ORIGIN_ANCHOR: Address = Address::repeat_byte(0x0e);
    pub const AUXILIARY_ANCHOR: Address = Address::repeat_byte(0x0f);
    pub const BENEFICIARY: Address = Address::repeat_byte(0x04);
    pub const STAKER: Address = Address::repeat_byte(0x05);
    pub const PROXY: Address = Address::repeat_byte(0x06);

    pub fn record(contract: Address, block_number: u64, event: ChainEvent) -> IndexedRecord {
        IndexedRecord {
            meta: RecordMeta {
                id: format!("{}-{block_number}", event.kind()),
                block_number,
                uts: block_number,
                contract_address: contract,
            },
            event,
        }
    }

    fn source_gateway(message_type: MessageType) -> Address {
        match message_type {
            MessageType::Stake => ORIGIN_GATEWAY,
            MessageType::Redeem => CO_GATEWAY,
        }
    }

    fn target_gateway(message_type: MessageType) -> Address {
        match message_type {
            MessageType::Stake => CO_GATEWAY,
            MessageType::Redeem => ORIGIN_GATEWAY,
        }
    }

    pub fn requested(
        message_type: MessageType,
        hash_byte: u8,
        block_number: u64,
        amount: U256,
    ) -> IndexedRecord {
        let requested = RequestedRecord {
            request_hash: Hash::repeat_byte(hash_byte),
            amount,
            beneficiary: BENEFICIARY,
            gas_price: U256::from(3),
            gas_limit: U256::from(4),
            nonce: U256::zero(),
            gateway: source_gateway(message_type),
            sender: STAKER,
            sender_proxy: PROXY,
        };
        match message_type {
            MessageType::Stake => {
                record(STAKE_POOL, block_number, ChainEvent::StakeRequested(requested))
            }
            MessageType::Redeem => {
                record(REDEEM_POOL, block_number, ChainEvent::RedeemRequested(requested))
            }
        }
    }

    pub fn declared(
        message_type: MessageType,
        message_byte: u8,
        block_number: u64,
        nonce: U256,
    ) -> IndexedRecord {
        let declared = DeclaredRecord {
            message_hash: Hash::repeat_byte(message_byte),
            sender: PROXY,
            nonce,
            beneficiary: BENEFICIARY,
            amount: U256::from(100),
        };
        let event = match message_type {
            MessageType::Stake => ChainEvent::StakeIntentDeclared(declared),
            MessageType::Redeem => ChainEvent::RedeemIntentDeclared(declared),
        };
        record(source_gateway(message_type), block_number, event)
    }

    pub fn confirmed(
        message_type: MessageType,
        message_byte: u8,
        block_number: u64,
        hash_lock: Hash,
    ) -> IndexedRecord {
        let confirmed = ConfirmedRecord {
            message_hash: Hash::repeat_byte(message_byte),
            sender: PROXY,
            nonce: U256::zero(),
            beneficiary: BENEFICIARY,
            amount: U256::from(100),
            block_height: block_number,
            hash_lock,
        };
        let event = match message_type {
            MessageType::Stake => ChainEvent::StakeIntentConfirmed(confirmed),
            MessageType::Redeem => ChainEvent::RedeemIntentConfirmed(confirmed),
        };
        record(target_gateway(message_type), block_number, event)
    }

    pub fn progressed(
        kind: EntityKind,
        message_byte: u8,
        block_number: u64,
        unlock_secret: Hash,
        proof_progress: bool,
    ) -> IndexedRecord {
        let progressed = ProgressedRecord {
            message_hash: Hash::repeat_byte(message_byte),
            sender: PROXY,
            nonce: None,
            proof_progress,
            unlock_secret,
        };
        let (emitter, event) = match kind {
            EntityKind::StakeProgressed => (ORIGIN_GATEWAY, ChainEvent::StakeProgressed(progressed)),
            EntityKind::MintProgressed => (CO_GATEWAY, ChainEvent::MintProgressed(progressed)),
            EntityKind::RedeemProgressed => (CO_GATEWAY, ChainEvent::RedeemProgressed(progressed)),
            EntityKind::UnstakeProgressed => {
                (ORIGIN_GATEWAY, ChainEvent::UnstakeProgressed(progressed))
            }
            other => panic!("{other} is not a progress kind"),
        };
        record(emitter, block_number, event)
    }

    pub fn state_root(anchor: Address, height: u64) -> IndexedRecord {
        record(
            anchor,
            height,
            ChainEvent::StateRootAvailable(StateRootAvailableRecord {
                block_height: height,
                state_root: Hash::repeat_byte(0x11),
            }),
        )
    }

    pub fn gateway_proven(gateway: Address, height: u64) -> IndexedRecord {
        let remote = if gateway == ORIGIN_GATEWAY {
            CO_GATEWAY
        } else {
            ORIGIN_GATEWAY
        };
        record(
            gateway,
            height,
            ChainEvent::GatewayProven(GatewayProvenRecord {
                remote_gateway: remote,
                block_height: height,
                storage_root: Hash::repeat_byte(0x22),
                was_already_proved: false,
            }),
        )
    }

    pub async fn seeded_repositories() -> Arc<Repositories> {
        let repos = Arc::new(Repositories::in_memory());
        repos
            .auxiliary_chains
            .save(AuxiliaryChain {
                chain_id: CHAIN_ID,
                origin_chain_name: "origin".to_string(),
                origin_gateway_address: ORIGIN_GATEWAY,
                auxiliary_gateway_address: CO_GATEWAY,
                origin_anchor_address: ORIGIN_ANCHOR,
                auxiliary_anchor_address: AUXILIARY_ANCHOR,
                last_origin_block_height: None,
                last_auxiliary_block_height: None,
            })
            .await
            .unwrap();
        for (address, gateway_type, remote, anchor) in [
            (ORIGIN_GATEWAY, GatewayType::Origin, CO_GATEWAY, ORIGIN_ANCHOR),
            (CO_GATEWAY, GatewayType::Auxiliary, ORIGIN_GATEWAY, AUXILIARY_ANCHOR),
        ] {
            repos
                .gateways
                .save(Gateway {
                    gateway_address: address,
                    chain_id: CHAIN_ID,
                    gateway_type,
                    remote_gateway_address: remote,
                    token_address: Address::repeat_byte(0x30),
                    anchor_address: anchor,
                    bounty: U256::from(10),
                    activation: true,
                    last_remote_gateway_proven_block_height: None,
                })
                .await
                .unwrap();
        }
        repos
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::service::TransactionDispatcher;
    use fc_02_storage::{Message, MessageStatus};
    use fc_03_event_index::{EventBatch, IndexedRecord};
    use proptest::prelude::*;
    use shared_types::{keccak256, Hash, U256};

    #[test]
    fn test_standard_handlers_cover_every_kind() {
        let handlers = standard_handlers(Arc::new(Repositories::in_memory()));
        let mut kinds: Vec<EntityKind> = handlers.iter().map(|h| h.kind()).collect();
        kinds.sort();
        let mut all = EntityKind::ALL.to_vec();
        all.sort();
        assert_eq!(kinds, all);
    }

    /// Message lifecycle events for one stake message, in an arbitrary order.
    fn lifecycle_event(step: u8, block: u64) -> IndexedRecord {
        let secret = Hash::repeat_byte(0x5e);
        match step % 5 {
            0 => requested(MessageType::Stake, 1, 5, U256::from(100)),
            1 => declared(MessageType::Stake, 0x20, block, U256::zero()),
            2 => confirmed(MessageType::Stake, 0x20, block, keccak256(secret.as_bytes())),
            3 => progressed(EntityKind::StakeProgressed, 0x20, block, secret, false),
            _ => progressed(EntityKind::MintProgressed, 0x20, block, secret, false),
        }
    }

    fn batch_of(records: &[IndexedRecord]) -> EventBatch {
        let mut batch = EventBatch::new();
        for record in records {
            batch.entry(record.event.kind()).or_default().push(record.clone());
        }
        batch
    }

    type Snapshot = (Option<Message>, Option<Option<Hash>>);

    async fn snapshot(repos: &Repositories) -> Snapshot {
        let message = repos.messages.get(&Hash::repeat_byte(0x20)).await.unwrap();
        let link = repos
            .requests
            .get(&Hash::repeat_byte(1))
            .await
            .unwrap()
            .map(|r| r.message_hash);
        (message, link)
    }

    fn rank(status: MessageStatus) -> u8 {
        status as u8
    }

    proptest! {
        #[test]
        fn prop_redelivery_is_idempotent(steps in proptest::collection::vec((0u8..5, 1u64..50), 1..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let once = seeded_repositories().await;
                let twice = seeded_repositories().await;
                let dispatch_once = TransactionDispatcher::with_standard_handlers(once.clone());
                let dispatch_twice = TransactionDispatcher::with_standard_handlers(twice.clone());

                for (step, block) in &steps {
                    let record = lifecycle_event(*step, *block);
                    dispatch_once.dispatch(batch_of(&[record.clone()])).await.unwrap();
                    // at-least-once: every batch may be delivered again
                    dispatch_twice.dispatch(batch_of(&[record.clone()])).await.unwrap();
                    dispatch_twice.dispatch(batch_of(&[record])).await.unwrap();
                }
                assert_eq!(snapshot(&once).await, snapshot(&twice).await);
            });
        }

        #[test]
        fn prop_statuses_never_regress(steps in proptest::collection::vec((0u8..5, 1u64..50), 1..16)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            runtime.block_on(async {
                let repos = seeded_repositories().await;
                let dispatcher = TransactionDispatcher::with_standard_handlers(repos.clone());
                let mut last = (0u8, 0u8);
                for (step, block) in steps {
                    let record = lifecycle_event(step, block);
                    dispatcher.dispatch(batch_of(&[record])).await.unwrap();
                    if let Some(message) = repos.messages.get(&Hash::repeat_byte(0x20)).await.unwrap() {
                        let now = (rank(message.source_status), rank(message.target_status));
                        assert!(now.0 >= last.0 && now.1 >= last.1, "{last:?} -> {now:?}");
                        last = now;
                    }
                }
            });
        }
    }
}
