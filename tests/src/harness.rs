//! # Test Harness
//!
//! A facilitator over an in-memory store, two in-memory event indexes and
//! mocked chain nodes. Delivery is driven by explicit sweeps instead of index
//! pushes, so every scenario runs deterministically:
//!
//! ```text
//! emit() ──► InMemoryEventIndex ──sync()──► Subscriber::sweep ──► DispatchLoop
//!                                                                      │
//!                              MockChainClient ◄── services ◄── notify ┘
//! ```

use facilitator_runtime::container::{
    ChainConfig, IndexConfig, StorageConfig, TokenConfig, TransactionConfig,
};
use facilitator_runtime::wiring::{
    attach_services, build_subscriber, seed_static_rows, subscription_targets, AttachedServices,
};
use facilitator_runtime::{ChainPorts, FacilitatorConfig, SubsystemContainer};
use fc_01_account::MockChainClient;
use fc_02_storage::{EntityKind, InMemoryKVStore, Message, MessageType, Repositories};
use fc_03_event_index::{BatchSink, InMemoryEventIndex, Subscriber};
use fc_04_dispatcher::dispatch_channel;
use fc_05_proof_services::MockProofGenerator;
use serde_json::{json, Value};
use shared_types::{Address, ChainSide, Hash, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const ORIGIN_CHAIN_ID: u64 = 3;
pub const AUXILIARY_CHAIN_ID: u64 = 1405;

/// Account that opened the request.
pub const SENDER: Address = Address::repeat_byte(0x31);
/// Proxy declaring intents for [`SENDER`].
pub const PROXY: Address = Address::repeat_byte(0x32);
/// Beneficiary on the target chain.
pub const BENEFICIARY: Address = Address::repeat_byte(0x33);

/// Upper bound of notification passes per settle.
const MAX_SETTLE_PASSES: usize = 8;

fn chain(chain_id: u64, offset: u8) -> ChainConfig {
    ChainConfig {
        chain_id,
        rpc_url: "http://localhost:8545".to_string(),
        index_http_url: "http://localhost:8000".to_string(),
        index_ws_url: "ws://localhost:8001".to_string(),
        facilitator_address: Address::repeat_byte(0x01),
        gateway_address: Address::repeat_byte(0x0a + offset),
        anchor_address: Address::repeat_byte(0x0e + offset),
        request_pool_address: Address::repeat_byte(0x0c + offset),
        password: "password".to_string(),
    }
}

/// Origin contracts at 0x0a (gateway), 0x0c (pool), 0x0e (anchor); the
/// auxiliary ones one byte higher.
pub fn config() -> FacilitatorConfig {
    FacilitatorConfig {
        origin_chain_name: "origin".to_string(),
        auxiliary_chain_id: AUXILIARY_CHAIN_ID,
        origin: chain(ORIGIN_CHAIN_ID, 0),
        auxiliary: chain(AUXILIARY_CHAIN_ID, 1),
        token: TokenConfig {
            value_token_address: Address::repeat_byte(0x21),
            utility_token_address: Address::repeat_byte(0x22),
            stake_bounty: U256::from(100),
            redeem_bounty: U256::from(50),
        },
        index: IndexConfig::default(),
        transactions: TransactionConfig::default(),
        storage: StorageConfig::default(),
    }
}

/// Mocked endpoints of one chain.
pub struct MockChain {
    pub index: Arc<InMemoryEventIndex>,
    pub node: Arc<MockChainClient>,
    pub proofs: Arc<MockProofGenerator>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            index: Arc::new(InMemoryEventIndex::new()),
            node: Arc::new(MockChainClient::default()),
            proofs: Arc::new(MockProofGenerator::default()),
        }
    }

    pub fn ports(&self) -> ChainPorts {
        ChainPorts {
            index: self.index.clone(),
            client: self.node.clone(),
            nonces: self.node.clone(),
            vault: self.node.clone(),
            proofs: self.proofs.clone(),
        }
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Harness {
    pub config: FacilitatorConfig,
    pub container: Arc<SubsystemContainer>,
    pub origin: MockChain,
    pub auxiliary: MockChain,
    services: Option<AttachedServices>,
    subscribers: Vec<Subscriber>,
    uts: AtomicU64,
}

impl Harness {
    /// Handlers and services.
    pub async fn new() -> Self {
        Self::build(true).await
    }

    /// Handlers only: events are folded into storage, nothing is submitted.
    pub async fn handlers_only() -> Self {
        Self::build(false).await
    }

    async fn build(with_services: bool) -> Self {
        let config = config();
        let origin = MockChain::new();
        let auxiliary = MockChain::new();
        let container = Arc::new(SubsystemContainer::new(
            config.clone(),
            Arc::new(InMemoryKVStore::new()),
            origin.ports(),
            auxiliary.ports(),
        ));

        let locked = container.unlock_accounts().await;
        assert!(locked.is_empty(), "accounts locked: {locked:?}");
        let services = with_services.then(|| attach_services(&container));
        seed_static_rows(&config, &container.repositories)
            .await
            .expect("seeding static rows");

        let (dispatch, dispatch_loop) =
            dispatch_channel(container.dispatcher.clone(), config.index.dispatch_capacity);
        tokio::spawn(dispatch_loop.run());
        let sink: Arc<dyn BatchSink> = Arc::new(dispatch);
        let subscribers = [ChainSide::Origin, ChainSide::Auxiliary]
            .into_iter()
            .map(|side| build_subscriber(&container, side, sink.clone()))
            .collect();

        let harness = Self {
            config,
            container,
            origin,
            auxiliary,
            services,
            subscribers,
            uts: AtomicU64::new(0),
        };
        harness.settle().await;
        harness
    }

    pub fn repositories(&self) -> &Repositories {
        &self.container.repositories
    }

    /// Attached services. Panics for a handlers-only harness.
    pub fn services(&self) -> &AttachedServices {
        self.services
            .as_ref()
            .expect("harness was built without services")
    }

    pub fn chain(&self, side: ChainSide) -> &MockChain {
        match side {
            ChainSide::Origin => &self.origin,
            ChainSide::Auxiliary => &self.auxiliary,
        }
    }

    /// Contract emitting `kind` on `side`.
    pub fn contract(&self, side: ChainSide, kind: EntityKind) -> Address {
        subscription_targets(&self.config, side)
            .into_iter()
            .find(|target| target.kind == kind)
            .map(|target| target.contract)
            .unwrap_or_else(|| panic!("{kind} is not emitted on {side}"))
    }

    /// Publishes a `kind` event mined at `block` on `side`. The common record
    /// fields are filled in; `fields` carries the event payload.
    pub fn emit(&self, side: ChainSide, kind: EntityKind, block: u64, fields: Value) {
        let uts = self.uts.fetch_add(1, Ordering::SeqCst) + 1;
        let mut raw = fields;
        let record = raw
            .as_object_mut()
            .expect("event fields must be a JSON object");
        record.insert("id".into(), json!(format!("{kind}-{uts}")));
        record.insert("blockNumber".into(), json!(block.to_string()));
        record.insert("uts".into(), json!(uts.to_string()));
        record.insert(
            "contractAddress".into(),
            json!(format!("{:?}", self.contract(side, kind))),
        );
        self.chain(side)
            .index
            .insert(kind, raw)
            .expect("record with valid metadata");
    }

    /// Sweeps every subscription target until both indexes are drained and
    /// every staged save was delivered.
    pub async fn sync(&self) {
        loop {
            let mut delivered = 0;
            for subscriber in &self.subscribers {
                for target in subscriber.targets() {
                    delivered += subscriber.sweep(target).await.expect("sweep");
                }
            }
            self.settle().await;
            if delivered == 0 {
                break;
            }
        }
    }

    /// Runs notification passes until nothing is staged.
    pub async fn settle(&self) {
        let repos = self.repositories();
        for _ in 0..MAX_SETTLE_PASSES {
            let staged = repos.messages.subject().staged_count()
                + repos.requests.subject().staged_count()
                + repos.auxiliary_chains.subject().staged_count()
                + repos.gateways.subject().staged_count()
                + repos.cursors.subject().staged_count();
            if staged == 0 {
                return;
            }
            repos.notify().await;
        }
    }

    pub async fn message(&self, message_hash: Hash) -> Message {
        self.repositories()
            .messages
            .get(&message_hash)
            .await
            .expect("storage")
            .expect("message stored")
    }

    /// Transactions sent on both chains.
    pub fn sent_count(&self) -> usize {
        self.origin.node.sent_count() + self.auxiliary.node.sent_count()
    }
}

/// Raw event payloads, in the field naming of the index.
pub mod events {
    use super::*;

    fn hex<T: std::fmt::Debug>(value: T) -> String {
        format!("{value:?}")
    }

    fn actor_fields(message_type: MessageType) -> (&'static str, &'static str) {
        match message_type {
            MessageType::Stake => ("_staker", "_stakerNonce"),
            MessageType::Redeem => ("_redeemer", "_redeemerNonce"),
        }
    }

    /// `StakeRequested` / `RedeemRequested` from [`SENDER`] via [`PROXY`].
    pub fn requested(
        message_type: MessageType,
        gateway: Address,
        request_hash: Hash,
        nonce: u64,
        amount: u64,
    ) -> Value {
        let (hash_field, gateway_field, sender_field, proxy_field) = match message_type {
            MessageType::Stake => ("stakeRequestHash", "gateway", "staker", "stakerProxy"),
            MessageType::Redeem => ("redeemRequestHash", "cogateway", "redeemer", "redeemerProxy"),
        };
        let mut raw = json!({
            "amount": amount.to_string(),
            "beneficiary": hex(BENEFICIARY),
            "gasPrice": "1",
            "gasLimit": "100000",
            "nonce": nonce.to_string(),
        });
        let fields = raw.as_object_mut().expect("object literal");
        fields.insert(hash_field.into(), json!(hex(request_hash)));
        fields.insert(gateway_field.into(), json!(hex(gateway)));
        fields.insert(sender_field.into(), json!(hex(SENDER)));
        fields.insert(proxy_field.into(), json!(hex(PROXY)));
        raw
    }

    /// `StakeIntentDeclared` / `RedeemIntentDeclared` by [`PROXY`].
    pub fn declared(message_type: MessageType, message_hash: Hash, nonce: u64, amount: u64) -> Value {
        let (sender, nonce_field) = actor_fields(message_type);
        let mut raw = json!({
            "_messageHash": hex(message_hash),
            "_beneficiary": hex(BENEFICIARY),
            "_amount": amount.to_string(),
        });
        let fields = raw.as_object_mut().expect("object literal");
        fields.insert(sender.into(), json!(hex(PROXY)));
        fields.insert(nonce_field.into(), json!(nonce.to_string()));
        raw
    }

    /// `StakeIntentConfirmed` / `RedeemIntentConfirmed`.
    pub fn confirmed(
        message_type: MessageType,
        message_hash: Hash,
        nonce: u64,
        amount: u64,
        block_height: u64,
        hash_lock: Hash,
    ) -> Value {
        let mut raw = declared(message_type, message_hash, nonce, amount);
        let fields = raw.as_object_mut().expect("object literal");
        fields.insert("_blockHeight".into(), json!(block_height.to_string()));
        fields.insert("_hashLock".into(), json!(hex(hash_lock)));
        raw
    }

    /// Any progress event revealing `secret`.
    pub fn progressed(message_type: MessageType, message_hash: Hash, nonce: u64, secret: Hash) -> Value {
        let (sender, nonce_field) = actor_fields(message_type);
        let mut raw = json!({
            "_messageHash": hex(message_hash),
            "_proofProgress": false,
            "_unlockSecret": hex(secret),
        });
        let fields = raw.as_object_mut().expect("object literal");
        fields.insert(sender.into(), json!(hex(PROXY)));
        fields.insert(nonce_field.into(), json!(nonce.to_string()));
        raw
    }

    /// `StateRootAvailable` for the remote chain's `block_height`.
    pub fn state_root(block_height: u64) -> Value {
        json!({
            "_blockHeight": block_height.to_string(),
            "_stateRoot": hex(Hash::repeat_byte(0x5a)),
        })
    }

    /// `GatewayProven` of `remote_gateway` at `block_height`.
    pub fn gateway_proven(remote_gateway: Address, block_height: u64) -> Value {
        json!({
            "_gateway": hex(remote_gateway),
            "_blockHeight": block_height.to_string(),
            "_storageRoot": hex(Hash::repeat_byte(0x5b)),
            "_wasAlreadyProved": false,
        })
    }
}
