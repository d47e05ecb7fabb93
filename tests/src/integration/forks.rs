//! # Fork Tolerance
//!
//! Chain reorganizations show up as the same event re-delivered from a later
//! block. Requests take the later payload and drop their message link; source
//! declarations move their height forward.

#[cfg(test)]
mod tests {
    use crate::harness::{events, Harness};
    use fc_01_account::BridgeCall;
    use fc_02_storage::{EntityKind, MessageType};
    use shared_types::{ChainSide, Hash, U256};

    const NONCE: u64 = 1;

    #[tokio::test]
    async fn test_request_link_is_reset_by_later_sighting() {
        let h = Harness::handlers_only().await;
        let gateway = h.config.origin.gateway_address;
        let request_hash = Hash::repeat_byte(0xaa);
        let message_hash = Hash::repeat_byte(0xbb);
        let requests = &h.repositories().requests;

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            10,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;
        let request = requests.get(&request_hash).await.unwrap().unwrap();
        assert_eq!(request.message_hash, None);
        assert_eq!(request.block_number, 10);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;
        let request = requests.get(&request_hash).await.unwrap().unwrap();
        assert_eq!(request.message_hash, Some(message_hash));

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            11,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;
        let request = requests.get(&request_hash).await.unwrap().unwrap();
        assert_eq!(request.message_hash, None);
        assert_eq!(request.block_number, 11);
        assert_eq!(h.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_sighting_keeps_stored_request() {
        let h = Harness::handlers_only().await;
        let gateway = h.config.origin.gateway_address;
        let request_hash = Hash::repeat_byte(0xac);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            12,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            9,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 999),
        );
        h.sync().await;

        let request = h
            .repositories()
            .requests
            .get(&request_hash)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.block_number, 12);
        assert_eq!(request.amount, U256::from(100));
    }

    #[tokio::test]
    async fn test_forked_request_is_accepted_again() {
        let h = Harness::new().await;
        let gateway = h.config.origin.gateway_address;
        let request_hash = Hash::repeat_byte(0xad);
        let requests = &h.repositories().requests;

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            10,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;
        let first = requests.get(&request_hash).await.unwrap().unwrap().message_hash;
        assert!(first.is_some());
        assert_eq!(h.origin.node.sent_count(), 1);

        // Same block again: a replay, not a fork.
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            10,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;
        assert_eq!(h.origin.node.sent_count(), 1);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeRequested,
            11,
            events::requested(MessageType::Stake, gateway, request_hash, NONCE, 100),
        );
        h.sync().await;

        let calls = h.origin.node.sent_calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[1].call, BridgeCall::AcceptStakeRequest(_)));
        let second = requests.get(&request_hash).await.unwrap().unwrap().message_hash;
        assert!(second.is_some());
        assert_ne!(first, second, "a fresh secret yields a fresh message");
    }

    #[tokio::test]
    async fn test_remined_declaration_defers_proof() {
        let h = Harness::new().await;
        let message_hash = Hash::repeat_byte(0xae);

        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            10,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;
        h.emit(
            ChainSide::Origin,
            EntityKind::StakeIntentDeclared,
            15,
            events::declared(MessageType::Stake, message_hash, NONCE, 100),
        );
        h.sync().await;
        assert_eq!(
            h.message(message_hash).await.source_declaration_block_height,
            Some(15)
        );

        // Origin root at 12 predates the re-mined declaration.
        h.emit(
            ChainSide::Auxiliary,
            EntityKind::StateRootAvailable,
            3,
            events::state_root(12),
        );
        h.sync().await;
        assert_eq!(h.auxiliary.node.sent_count(), 0);
        assert_eq!(h.origin.proofs.request_count(), 0);

        h.emit(
            ChainSide::Auxiliary,
            EntityKind::StateRootAvailable,
            4,
            events::state_root(15),
        );
        h.sync().await;
        assert_eq!(h.auxiliary.node.sent_count(), 1);
    }
}
