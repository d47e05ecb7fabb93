//! # Stake Flow
//!
//! One stake message from the request on origin to both progress events.
//!
//! ```text
//! StakeRequested ──► acceptStakeRequest (origin pool)
//! StakeIntentDeclared ──► (waits for an anchored origin root)
//! StateRootAvailable(aux anchor) ──► proveGateway (co-gateway)
//! GatewayProven(co-gateway) ──► confirmStakeIntent (co-gateway)
//! StakeIntentConfirmed ──► progressStake (gateway) + progressMint (co-gateway)
//! StakeProgressed + MintProgressed ──► done
//! ```

#[cfg(test)]
mod tests {
    use crate::harness::{events, Harness, BENEFICIARY, PROXY};
    use fc_01_account::{BridgeCall, MockChainClient};
    use fc_02_storage::{EntityKind, MessageStatus, MessageType};
    use shared_types::{keccak256, ChainSide, Hash, U256};

    const AMOUNT: u64 = 1_000;
    const NONCE: u64 = 1;

    #[tokio::test]
    async fn test_stake_message_runs_to_completion() {
        let h = Harness::new().await;
        let origin_gateway = h.config.origin.gateway_address;
        let co_gateway = h.config.auxiliary.gateway_address;
        let request_hash = Hash::repeat_byte(0xaa);

        // 1. Request accepted on the origin pool with the stake bounty.
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            5,
            events::requested(MessageType::Stake, origin_gateway, request_hash, NONCE, AMOUNT),
        );
        h.sync().await;

        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 1);
        assert_eq!(origin_calls[0].to, h.config.origin.request_pool_address);
        let BridgeCall::AcceptStakeRequest(args) = &origin_calls[0].call else {
            panic!("expected acceptStakeRequest, got {}", origin_calls[0].call.name());
        };
        assert_eq!(args.amount, U256::from(AMOUNT));
        assert_eq!(args.beneficiary, BENEFICIARY);
        assert_eq!(h.origin.node.sent_options()[0].value, U256::from(100));

        let request = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .unwrap();
        let message_hash = request.message_hash.expect("request linked on acceptance");
        assert_eq!(message_hash, MockChainClient::declared_message_hash(&origin_calls[0]));

        let message = h.message(message_hash).await;
        let secret = message.secret.expect("secret kept by the facilitator");
        let hash_lock = message.hash_lock.expect("hash lock recorded");
        assert_eq!(keccak256(secret.as_bytes()), hash_lock);
        assert_eq!(args.hash_lock, hash_lock);
        assert_eq!(message.sender, PROXY);
        assert_eq!(message.source_status, MessageStatus::Undeclared);

        // 2. Declared on origin. Nothing to prove until a root is anchored.
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, AMOUNT),
        );
        h.sync().await;

        let message = h.message(message_hash).await;
        assert_eq!(message.source_status, MessageStatus::Declared);
        assert_eq!(message.source_declaration_block_height, Some(10));
        assert_eq!(h.auxiliary.node.sent_count(), 0);

        // 3. Origin root at 12 anchored on auxiliary: the gateway is proven.
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::StateRootAvailable,
            7,
            events::state_root(12),
        );
        h.sync().await;

        let aux_calls = h.auxiliary.node.sent_calls();
        assert_eq!(aux_calls.len(), 1);
        assert_eq!(aux_calls[0].to, co_gateway);
        assert!(matches!(
            aux_calls[0].call,
            BridgeCall::ProveGateway { block_height: 12, .. }
        ));
        let proof_requests = h.origin.proofs.requests();
        assert_eq!(proof_requests.len(), 1);
        assert_eq!(proof_requests[0].0, origin_gateway);
        assert_eq!(proof_requests[0].2, 12);

        // 4. Co-gateway reports the proof: the intent is confirmed there.
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::GatewayProven,
            8,
            events::gateway_proven(origin_gateway, 12),
        );
        h.sync().await;

        let aux_calls = h.auxiliary.node.sent_calls();
        assert_eq!(aux_calls.len(), 2);
        assert_eq!(aux_calls[1].to, co_gateway);
        let BridgeCall::ConfirmStakeIntent(confirm) = &aux_calls[1].call else {
            panic!("expected confirmStakeIntent, got {}", aux_calls[1].call.name());
        };
        assert_eq!(confirm.hash_lock, hash_lock);
        assert_eq!(confirm.block_height, 12);
        assert_eq!(confirm.sender, PROXY);
        assert_eq!(confirm.sender_nonce, U256::from(NONCE));
        assert_eq!(h.origin.proofs.request_count(), 2);

        // 5. Confirmed on auxiliary: both sides progress with the secret.
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::StakeIntentConfirmed,
            9,
            events::confirmed(MessageType::Stake, message_hash, NONCE, AMOUNT, 12, hash_lock),
        );
        h.sync().await;

        assert_eq!(h.message(message_hash).await.target_status, MessageStatus::Declared);
        let origin_calls = h.origin.node.sent_calls();
        assert_eq!(origin_calls.len(), 2);
        assert_eq!(origin_calls[1].to, origin_gateway);
        assert!(matches!(
            &origin_calls[1].call,
            BridgeCall::ProgressStake(p) if p.message_hash == message_hash && p.unlock_secret == secret
        ));
        let aux_calls = h.auxiliary.node.sent_calls();
        assert_eq!(aux_calls.len(), 3);
        assert_eq!(aux_calls[2].to, co_gateway);
        assert!(matches!(
            &aux_calls[2].call,
            BridgeCall::ProgressMint(p) if p.unlock_secret == secret
        ));

        // 6. Both progress events land: terminal, nothing more is sent.
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeProgressed,
            11,
            events::progressed(MessageType::Stake, message_hash, NONCE, secret),
        );
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::MintProgressed,
            10,
            events::progressed(MessageType::Stake, message_hash, NONCE, secret),
        );
        h.sync().await;

        let message = h.message(message_hash).await;
        assert_eq!(message.source_status, MessageStatus::Progressed);
        assert_eq!(message.target_status, MessageStatus::Progressed);
        assert_eq!(h.origin.node.sent_count(), 2);
        assert_eq!(h.auxiliary.node.sent_count(), 3);
    }

    #[tokio::test]
    async fn test_request_for_unknown_gateway_is_stored_but_not_accepted() {
        let h = Harness::new().await;
        let unknown_gateway = shared_types::Address::repeat_byte(0x77);
        let request_hash = Hash::repeat_byte(0xab);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            5,
            events::requested(MessageType::Stake, unknown_gateway, request_hash, NONCE, AMOUNT),
        );
        h.sync().await;

        // Stored, but never accepted: the gateway has no row.
        let request = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.message_hash, None);
        assert_eq!(h.sent_count(), 0);
    }
}
