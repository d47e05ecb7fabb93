//! # Redeem Flow
//!
//! The mirror of the stake flow, from the auxiliary redeem pool back to
//! origin.

#[cfg(test)]
mod tests {
    use crate::harness::{events, Harness};
    use fc_01_account::BridgeCall;
    use fc_02_storage::{EntityKind, MessageDirection, MessageStatus, MessageType};
    use fc_05_proof_services::ReactOutcome;
    use shared_types::{ChainSide, Hash, U256};

    const AMOUNT: u64 = 400;
    const NONCE: u64 = 3;

    #[tokio::test]
    async fn test_redeem_message_runs_to_completion() {
        let h = Harness::new().await;
        let origin_gateway = h.config.origin.gateway_address;
        let co_gateway = h.config.auxiliary.gateway_address;
        let request_hash = Hash::repeat_byte(0xbb);

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::RedeemRequested,
            20,
            events::requested(MessageType::Redeem, co_gateway, request_hash, NONCE, AMOUNT),
        );
        h.sync().await;

        let aux_calls = h.auxiliary.node.sent_calls();
        assert_eq!(aux_calls.len(), 1);
        assert_eq!(aux_calls[0].to, h.config.auxiliary.request_pool_address);
        assert!(matches!(aux_calls[0].call, BridgeCall::AcceptRedeemRequest(_)));
        assert_eq!(h.auxiliary.node.sent_options()[0].value, U256::from(50));
        assert_eq!(h.origin.node.sent_count(), 0);

        let message_hash = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .and_then(|request| request.message_hash)
            .expect("request linked on acceptance");
        let message = h.message(message_hash).await;
        assert_eq!(message.direction, MessageDirection::AuxiliaryToOrigin);
        assert_eq!(message.gateway_address, co_gateway);
        let secret = message.secret.unwrap();
        let hash_lock = message.hash_lock.unwrap();

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::RedeemIntentDeclared,
            21,
            events::declared(MessageType::Redeem, message_hash, NONCE, AMOUNT),
        );
        h.sync().await;
        assert_eq!(h.origin.node.sent_count(), 0);

        // Auxiliary root at 25 anchored on origin.
        h.emit(
            ChainSide::Origin,
            EntityKind::StateRootAvailable,
            40,
            events::state_root(25),
        );
        h.sync().await;

        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 1);
        assert_eq!(origin_calls[0].to, origin_gateway);
        assert!(matches!(
            origin_calls[0].call,
            BridgeCall::ProveGateway { block_height: 25, .. }
        ));
        assert_eq!(h.auxiliary.proofs.requests()[0].0, co_gateway);
        assert_eq!(h.origin.proofs.request_count(), 0);

        h.emit(
            ChainSide::Origin,
            EntityKind::GatewayProven,
            41,
            events::gateway_proven(co_gateway, 25),
        );
        h.sync().await;

        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 2);
        assert!(matches!(
            &origin_calls[1].call,
            BridgeCall::ConfirmRedeemIntent(args) if args.hash_lock == hash_lock && args.block_height == 25
        ));

        h.emit(
            ChainSide::Origin,
            EntityKind::RedeemIntentConfirmed,
            42,
            events::confirmed(MessageType::Redeem, message_hash, NONCE, AMOUNT, 25, hash_lock),
        );
        h.sync().await;

        // progressRedeem on the co-gateway, progressUnstake on the gateway.
        let aux_calls = h.auxiliary.node.sent_calls();
        assert_eq!(aux_calls.len(), 2);
        assert_eq!(aux_calls[1].to, co_gateway);
        assert!(matches!(
            &aux_calls[1].call,
            BridgeCall::ProgressRedeem(p) if p.unlock_secret == secret
        ));
        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 3);
        assert_eq!(origin_calls[2].to, origin_gateway);
        assert!(matches!(&origin_calls[2].call, BridgeCall::ProgressUnstake(_)));

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::RedeemProgressed,
            22,
            events::progressed(MessageType::Redeem, message_hash, NONCE, secret),
        );
        h.emit(
            ChainSide::Origin,
            EntityKind::UnstakeProgressed,
            43,
            events::progressed(MessageType::Redeem, message_hash, NONCE, secret),
        );
        h.sync().await;

        let message = h.message(message_hash).await;
        assert_eq!(message.source_status, MessageStatus::Progressed);
        assert_eq!(message.target_status, MessageStatus::Progressed);
        assert_eq!(h.sent_count(), 5);
    }

    #[tokio::test]
    async fn test_root_anchored_below_declaration_waits_for_next_root() {
        let h = Harness::new().await;
        let co_gateway = h.config.auxiliary.gateway_address;

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::RedeemIntentDeclared,
            30,
            events::declared(MessageType::Redeem, Hash::repeat_byte(0xbc), NONCE, AMOUNT),
        );
        h.emit(
            ChainSide::Origin,
            EntityKind::StateRootAvailable,
            50,
            events::state_root(29),
        );
        h.sync().await;
        assert_eq!(h.origin.node.sent_count(), 0);

        let outcome = h.services().prove_auxiliary.react_to(29).await.unwrap();
        assert_eq!(outcome, ReactOutcome::NothingPending);

        h.emit(
            ChainSide::Origin,
            EntityKind::StateRootAvailable,
            51,
            events::state_root(30),
        );
        h.sync().await;
        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 1);
        assert!(matches!(
            origin_calls[0].call,
            BridgeCall::ProveGateway { block_height: 30, .. }
        ));
        assert_eq!(h.auxiliary.proofs.requests()[0].0, co_gateway);
    }
}
