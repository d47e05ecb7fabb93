//! # Lifecycle Scenarios
//!
//! Short scenarios around single transitions and the proving services'
//! direct `react_to` entry points.

#[cfg(test)]
mod tests {
    use crate::harness::{events, Harness};
    use fc_01_account::BridgeCall;
    use fc_02_storage::{EntityKind, MessageStatus, MessageType};
    use fc_05_proof_services::ReactOutcome;
    use shared_types::{keccak256, ChainSide, Hash};

    const NONCE: u64 = 4;

    #[tokio::test]
    async fn test_mint_progressed_completes_undeclared_target() {
        let h = Harness::handlers_only().await;
        let message_hash = Hash::repeat_byte(0xc1);
        let secret = Hash::repeat_byte(0x5e);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;
        assert_eq!(h.message(message_hash).await.target_status, MessageStatus::Undeclared);

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::MintProgressed,
            20,
            events::progressed(MessageType::Stake, message_hash, NONCE, secret),
        );
        h.sync().await;
        let message = h.message(message_hash).await;
        assert_eq!(message.target_status, MessageStatus::Progressed);
        assert_eq!(message.secret, Some(secret));

        // Replayed: status and secret stay as they are.
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::MintProgressed,
            20,
            events::progressed(MessageType::Stake, message_hash, NONCE, secret),
        );
        h.sync().await;
        assert_eq!(h.message(message_hash).await, message);
    }

    #[tokio::test]
    async fn test_progress_for_unknown_message_creates_it() {
        let h = Harness::handlers_only().await;
        let message_hash = Hash::repeat_byte(0xc2);

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::MintProgressed,
            20,
            events::progressed(MessageType::Stake, message_hash, NONCE, Hash::repeat_byte(0x5f)),
        );
        h.sync().await;

        let message = h.message(message_hash).await;
        assert_eq!(message.target_status, MessageStatus::Progressed);
        assert_eq!(message.source_status, MessageStatus::Undeclared);
        // Resolved through the co-gateway's remote gateway.
        assert_eq!(message.gateway_address, h.config.origin.gateway_address);
    }

    #[tokio::test]
    async fn test_prove_react_to_submits_once_per_pending_set() {
        let h = Harness::new().await;
        let prove = &h.services().prove_origin;

        let outcome = prove.react_to(100).await.unwrap();
        assert_eq!(outcome, ReactOutcome::NothingPending);
        assert_eq!(h.origin.proofs.request_count(), 0);
        assert_eq!(h.auxiliary.node.sent_count(), 0);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            40,
            events::declared(MessageType::Stake, Hash::repeat_byte(0xc3), NONCE, 100),
        );
        h.sync().await;
        assert_eq!(h.auxiliary.node.sent_count(), 0);

        let outcome = prove.react_to(100).await.unwrap();
        assert_eq!(outcome.submissions(), 1);
        assert_eq!(h.origin.proofs.request_count(), 1);
        assert_eq!(h.auxiliary.node.sent_count(), 1);

        let outcome = prove.react_to(100).await.unwrap();
        assert_eq!(outcome, ReactOutcome::AlreadyProven { height: 100 });
        assert_eq!(h.origin.proofs.request_count(), 1);
        assert_eq!(h.auxiliary.node.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_proven_target_height_skips_proof() {
        let h = Harness::new().await;
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            40,
            events::declared(MessageType::Stake, Hash::repeat_byte(0xc4), NONCE, 100),
        );
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::GatewayProven,
            5,
            events::gateway_proven(h.config.origin.gateway_address, 120),
        );
        h.sync().await;

        let outcome = h.services().prove_origin.react_to(100).await.unwrap();
        assert_eq!(outcome, ReactOutcome::AlreadyProven { height: 100 });
        assert_eq!(h.origin.proofs.request_count(), 0);
    }

    #[tokio::test]
    async fn test_confirm_react_to_skips_in_flight_messages() {
        let h = Harness::new().await;
        let co_gateway = h.config.auxiliary.gateway_address;
        let request_hash = Hash::repeat_byte(0xc5);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            5,
            events::requested(
                MessageType::Stake,
                h.config.origin.gateway_address,
                request_hash,
                NONCE,
                100,
            ),
        );
        h.sync().await;
        let message_hash = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .and_then(|r| r.message_hash)
            .unwrap();
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;

        let confirm = &h.services().confirm_stake;
        let first = confirm.react_to(co_gateway, 12).await.unwrap();
        assert_eq!(first.submissions(), 1);
        assert_eq!(confirm.in_flight(), 1);

        let second = confirm.react_to(co_gateway, 12).await.unwrap();
        assert_eq!(second, ReactOutcome::NothingPending);
        assert_eq!(h.auxiliary.node.sent_count(), 1);

        let calls = h.auxiliary.node.sent_calls();
        let BridgeCall::ConfirmStakeIntent(args) = &calls[0].call else {
            panic!("expected confirmStakeIntent, got {}", calls[0].call.name());
        };
        let message = h.message(message_hash).await;
        assert_eq!(Some(args.hash_lock), message.hash_lock);
        assert_eq!(keccak256(message.secret.unwrap().as_bytes()), args.hash_lock);
    }

    #[tokio::test]
    async fn test_declaration_seen_before_request_is_not_accepted_again() {
        let h = Harness::new().await;
        let gateway = h.config.origin.gateway_address;
        let request_hash = Hash::repeat_byte(0xaa);
        let message_hash = Hash::repeat_byte(0xbb);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            10,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;

        let request = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.message_hash, Some(message_hash));
        assert_eq!(h.origin.node.sent_count(), 0);
    }
}
