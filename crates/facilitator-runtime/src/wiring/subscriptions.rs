//! Which contract emits which event kind on each chain.
//!
//! | Chain | Contract | Kinds |
//! |-------|----------|-------|
//! | origin | stake pool | `StakeRequested` |
//! | origin | gateway | `StakeIntentDeclared`, `StakeProgressed`, `RedeemIntentConfirmed`, `UnstakeProgressed`, `GatewayProven` |
//! | origin | anchor | `StateRootAvailable` |
//! | auxiliary | redeem pool | `RedeemRequested` |
//! | auxiliary | co-gateway | `RedeemIntentDeclared`, `RedeemProgressed`, `StakeIntentConfirmed`, `MintProgressed`, `GatewayProven` |
//! | auxiliary | anchor | `StateRootAvailable` |

use crate::container::{FacilitatorConfig, SubsystemContainer};
use fc_02_storage::EntityKind;
use fc_03_event_index::{BatchSink, Subscriber, SubscriptionTarget};
use shared_types::ChainSide;
use std::sync::Arc;

/// Every (kind, contract) pair subscribed on `side`.
pub fn subscription_targets(config: &FacilitatorConfig, side: ChainSide) -> Vec<SubscriptionTarget> {
    let chain = match side {
        ChainSide::Origin => &config.origin,
        ChainSide::Auxiliary => &config.auxiliary,
    };
    let (requested, gateway_kinds) = match side {
        ChainSide::Origin => (
            EntityKind::StakeRequested,
            [
                EntityKind::StakeIntentDeclared,
                EntityKind::StakeProgressed,
                EntityKind::RedeemIntentConfirmed,
                EntityKind::UnstakeProgressed,
                EntityKind::GatewayProven,
            ],
        ),
        ChainSide::Auxiliary => (
            EntityKind::RedeemRequested,
            [
                EntityKind::RedeemIntentDeclared,
                EntityKind::RedeemProgressed,
                EntityKind::StakeIntentConfirmed,
                EntityKind::MintProgressed,
                EntityKind::GatewayProven,
            ],
        ),
    };

    let target = |kind, contract| SubscriptionTarget {
        side,
        kind,
        contract,
    };
    let mut targets = vec![target(requested, chain.request_pool_address)];
    targets.extend(
        gateway_kinds
            .into_iter()
            .map(|kind| target(kind, chain.gateway_address)),
    );
    targets.push(target(EntityKind::StateRootAvailable, chain.anchor_address));
    targets
}

/// Subscriber of `side` delivering into `sink`.
pub fn build_subscriber(
    container: &SubsystemContainer,
    side: ChainSide,
    sink: Arc<dyn BatchSink>,
) -> Subscriber {
    let chain = container.chain(side);
    Subscriber::new(
        side,
        chain.ports.index.clone(),
        chain.fetcher.clone(),
        sink,
        subscription_targets(&container.config, side),
    )
}
