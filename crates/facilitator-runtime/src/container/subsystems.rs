//! # Subsystem Container
//!
//! Holds the shared instances of one facilitator process.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: KeyValueStore → Repositories
//! Level 1: Accounts, TransactionSubmitters (per chain)
//! Level 2: TransactionDispatcher
//! Level 3: TransactionFetcher (per chain)
//! ```
//!
//! External endpoints arrive as [`ChainPorts`], so the same container runs
//! against real nodes or against in-process mocks.

use std::sync::Arc;

use fc_01_account::{Account, ChainClient, KeyVault, NonceSource, TransactionSubmitter};
use fc_02_storage::{KeyValueStore, Repositories};
use fc_03_event_index::{EventIndex, GraphQlIndexClient, TransactionFetcher};
use fc_04_dispatcher::TransactionDispatcher;
use fc_05_proof_services::ProofGenerator;
use shared_types::ChainSide;
use tracing::info;

use crate::adapters::{JsonRpcChainClient, JsonRpcProofGenerator};
use crate::container::config::{ChainConfig, FacilitatorConfig};

/// Endpoints of one chain.
#[derive(Clone)]
pub struct ChainPorts {
    /// Event index of the chain.
    pub index: Arc<dyn EventIndex>,
    /// Transaction submission.
    pub client: Arc<dyn ChainClient>,
    /// Nonce queries.
    pub nonces: Arc<dyn NonceSource>,
    /// Keystore.
    pub vault: Arc<dyn KeyVault>,
    /// Gateway proofs.
    pub proofs: Arc<dyn ProofGenerator>,
}

impl ChainPorts {
    /// GraphQL index plus a JSON-RPC node, as configured.
    pub fn connect(chain: &ChainConfig) -> Self {
        let node = Arc::new(JsonRpcChainClient::new(chain.rpc_url.clone()));
        Self {
            index: Arc::new(GraphQlIndexClient::new(
                chain.index_http_url.clone(),
                chain.index_ws_url.clone(),
            )),
            client: node.clone(),
            nonces: node.clone(),
            vault: node,
            proofs: Arc::new(JsonRpcProofGenerator::new(chain.rpc_url.clone())),
        }
    }
}

/// Per-chain instances.
pub struct ChainSubsystems {
    /// Chain side.
    pub side: ChainSide,
    /// Endpoints.
    pub ports: ChainPorts,
    /// Facilitator account.
    pub account: Arc<Account>,
    /// Sends from `account`.
    pub submitter: Arc<TransactionSubmitter>,
    /// Sweeps the chain's index into the dispatcher.
    pub fetcher: Arc<TransactionFetcher>,
}

impl ChainSubsystems {
    fn new(
        side: ChainSide,
        chain: &ChainConfig,
        config: &FacilitatorConfig,
        ports: ChainPorts,
        repositories: &Arc<Repositories>,
    ) -> Self {
        let account = Arc::new(Account::new(
            chain.facilitator_address,
            ports.vault.clone(),
            ports.nonces.clone(),
        ));
        let submitter = Arc::new(TransactionSubmitter::new(
            side,
            account.clone(),
            ports.client.clone(),
            config.transactions.gas_settings(),
        ));
        let fetcher = Arc::new(TransactionFetcher::new(
            ports.index.clone(),
            repositories.clone(),
            config.index.page_size,
        ));
        Self {
            side,
            ports,
            account,
            submitter,
            fetcher,
        }
    }
}

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Configuration the container was built from.
    pub config: FacilitatorConfig,
    /// Typed repositories over the store.
    pub repositories: Arc<Repositories>,
    /// Applies index batches.
    pub dispatcher: Arc<TransactionDispatcher>,
    /// Origin chain.
    pub origin: ChainSubsystems,
    /// Auxiliary chain.
    pub auxiliary: ChainSubsystems,
}

impl SubsystemContainer {
    /// Builds every subsystem over `store` and the given endpoints.
    pub fn new(
        config: FacilitatorConfig,
        store: Arc<dyn KeyValueStore>,
        origin: ChainPorts,
        auxiliary: ChainPorts,
    ) -> Self {
        info!("Initializing facilitator subsystems");

        let repositories = Arc::new(Repositories::new(store));
        let dispatcher = Arc::new(TransactionDispatcher::with_standard_handlers(
            repositories.clone(),
        ));
        let origin = ChainSubsystems::new(
            ChainSide::Origin,
            &config.origin,
            &config,
            origin,
            &repositories,
        );
        let auxiliary = ChainSubsystems::new(
            ChainSide::Auxiliary,
            &config.auxiliary,
            &config,
            auxiliary,
            &repositories,
        );

        Self {
            config,
            repositories,
            dispatcher,
            origin,
            auxiliary,
        }
    }

    /// Subsystems of `side`.
    pub fn chain(&self, side: ChainSide) -> &ChainSubsystems {
        match side {
            ChainSide::Origin => &self.origin,
            ChainSide::Auxiliary => &self.auxiliary,
        }
    }

    /// Unlocks both facilitator accounts. Returns the sides that stayed locked.
    pub async fn unlock_accounts(&self) -> Vec<ChainSide> {
        let mut locked = Vec::new();
        for (chain, password) in [
            (&self.origin, &self.config.origin.password),
            (&self.auxiliary, &self.config.auxiliary.password),
        ] {
            if !chain.account.unlock(password).await {
                locked.push(chain.side);
            }
        }
        locked
    }
}
