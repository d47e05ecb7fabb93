//! Static rows derived from configuration.
//!
//! Addresses, token and bounty come from the config on every start. Heights
//! are owned by the handlers and are carried over from the stored row.

use crate::container::FacilitatorConfig;
use fc_02_storage::{AuxiliaryChain, Gateway, GatewayType, Repositories, StorageError};
use tracing::info;

/// Auxiliary chain row for `config`, keeping heights from `stored`.
pub fn auxiliary_chain_row(config: &FacilitatorConfig, stored: Option<&AuxiliaryChain>) -> AuxiliaryChain {
    AuxiliaryChain {
        chain_id: config.auxiliary_chain_id,
        origin_chain_name: config.origin_chain_name.clone(),
        origin_gateway_address: config.origin.gateway_address,
        auxiliary_gateway_address: config.auxiliary.gateway_address,
        origin_anchor_address: config.origin.anchor_address,
        auxiliary_anchor_address: config.auxiliary.anchor_address,
        last_origin_block_height: stored.and_then(|row| row.last_origin_block_height),
        last_auxiliary_block_height: stored.and_then(|row| row.last_auxiliary_block_height),
    }
}

/// Gateway row of `gateway_type` for `config`, keeping the proven height.
pub fn gateway_row(
    config: &FacilitatorConfig,
    gateway_type: GatewayType,
    stored: Option<&Gateway>,
) -> Gateway {
    let (local, remote, token, bounty) = match gateway_type {
        GatewayType::Origin => (
            &config.origin,
            &config.auxiliary,
            config.token.value_token_address,
            config.token.stake_bounty,
        ),
        GatewayType::Auxiliary => (
            &config.auxiliary,
            &config.origin,
            config.token.utility_token_address,
            config.token.redeem_bounty,
        ),
    };
    Gateway {
        gateway_address: local.gateway_address,
        chain_id: config.auxiliary_chain_id,
        gateway_type,
        remote_gateway_address: remote.gateway_address,
        token_address: token,
        anchor_address: local.anchor_address,
        bounty,
        activation: true,
        last_remote_gateway_proven_block_height: stored
            .and_then(|row| row.last_remote_gateway_proven_block_height),
    }
}

/// Upserts the auxiliary chain and both gateways.
///
/// The saves are staged like any other; the next notification pass lets
/// the services react to the stored heights.
pub async fn seed_static_rows(
    config: &FacilitatorConfig,
    repositories: &Repositories,
) -> Result<(), StorageError> {
    let stored = repositories.auxiliary_chains.get(config.auxiliary_chain_id).await?;
    let chain = repositories
        .auxiliary_chains
        .save(auxiliary_chain_row(config, stored.as_ref()))
        .await?;

    for gateway_type in [GatewayType::Origin, GatewayType::Auxiliary] {
        let address = match gateway_type {
            GatewayType::Origin => config.origin.gateway_address,
            GatewayType::Auxiliary => config.auxiliary.gateway_address,
        };
        let stored = repositories.gateways.get(address).await?;
        repositories
            .gateways
            .save(gateway_row(config, gateway_type, stored.as_ref()))
            .await?;
    }

    info!(
        chain_id = chain.chain_id,
        origin = %chain.origin_chain_name,
        last_origin_block_height = ?chain.last_origin_block_height,
        last_auxiliary_block_height = ?chain.last_auxiliary_block_height,
        "Static rows seeded"
    );
    Ok(())
}
