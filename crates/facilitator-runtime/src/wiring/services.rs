//! Attaches the reactive services to the repository subjects.
//!
//! ```text
//! AuxiliaryChain ──► ProveGateway (origin→auxiliary, auxiliary→origin)
//! Gateway        ──► ConfirmIntent (origin→auxiliary, auxiliary→origin)
//! Message        ──► Progress
//! Request        ──► AcceptRequest (stake, redeem)
//! ```
//!
//! Proofs always come from the source chain of a direction and transactions
//! go to its target chain.

use crate::container::SubsystemContainer;
use fc_02_storage::{MessageDirection, MessageType};
use fc_05_proof_services::{
    AcceptRequestService, ConfirmIntentService, ProgressService, ProveGatewayService,
};
use std::sync::Arc;
use tracing::info;

/// Handles to the attached services.
pub struct AttachedServices {
    /// Proves the origin gateway on auxiliary.
    pub prove_origin: Arc<ProveGatewayService>,
    /// Proves the co-gateway on origin.
    pub prove_auxiliary: Arc<ProveGatewayService>,
    /// Confirms stake intents on auxiliary.
    pub confirm_stake: Arc<ConfirmIntentService>,
    /// Confirms redeem intents on origin.
    pub confirm_redeem: Arc<ConfirmIntentService>,
    /// Progresses messages on both chains.
    pub progress: Arc<ProgressService>,
    /// Accepts stake requests on origin.
    pub accept_stake: Arc<AcceptRequestService>,
    /// Accepts redeem requests on auxiliary.
    pub accept_redeem: Arc<AcceptRequestService>,
}

/// Builds every service and attaches it to its subject.
pub fn attach_services(container: &SubsystemContainer) -> AttachedServices {
    let repos = &container.repositories;
    let config = &container.config;
    let (origin, auxiliary) = (&container.origin, &container.auxiliary);

    let prove = |direction: MessageDirection| {
        let (source, target) = (container.chain(direction.source()), container.chain(direction.target()));
        Arc::new(ProveGatewayService::new(
            config.auxiliary_chain_id,
            direction,
            repos.clone(),
            source.ports.proofs.clone(),
            target.submitter.clone(),
        ))
    };
    let confirm = |direction: MessageDirection| {
        let (source, target) = (container.chain(direction.source()), container.chain(direction.target()));
        Arc::new(ConfirmIntentService::new(
            direction,
            repos.clone(),
            source.ports.proofs.clone(),
            target.submitter.clone(),
        ))
    };

    let services = AttachedServices {
        prove_origin: prove(MessageDirection::OriginToAuxiliary),
        prove_auxiliary: prove(MessageDirection::AuxiliaryToOrigin),
        confirm_stake: confirm(MessageDirection::OriginToAuxiliary),
        confirm_redeem: confirm(MessageDirection::AuxiliaryToOrigin),
        progress: Arc::new(ProgressService::new(
            repos.clone(),
            origin.submitter.clone(),
            auxiliary.submitter.clone(),
        )),
        accept_stake: Arc::new(AcceptRequestService::new(
            MessageType::Stake,
            config.origin.request_pool_address,
            repos.clone(),
            origin.submitter.clone(),
        )),
        accept_redeem: Arc::new(AcceptRequestService::new(
            MessageType::Redeem,
            config.auxiliary.request_pool_address,
            repos.clone(),
            auxiliary.submitter.clone(),
        )),
    };

    let chains = repos.auxiliary_chains.subject();
    chains.attach(services.prove_origin.clone());
    chains.attach(services.prove_auxiliary.clone());

    let gateways = repos.gateways.subject();
    gateways.attach(services.confirm_stake.clone());
    gateways.attach(services.confirm_redeem.clone());

    repos.messages.subject().attach(services.progress.clone());

    let requests = repos.requests.subject();
    requests.attach(services.accept_stake.clone());
    requests.attach(services.accept_redeem.clone());

    info!("Reactive services attached");
    services
}
