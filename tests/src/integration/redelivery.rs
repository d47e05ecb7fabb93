//! # At-Least-Once Redelivery
//!
//! The index may hand out the same event any number of times. However often
//! each lifecycle event arrives, a stake message costs exactly five
//! transactions and ends progressed on both sides.

#[cfg(test)]
mod tests {
    use crate::harness::{events, Harness};
    use fc_02_storage::{EntityKind, MessageStatus, MessageType};
    use proptest::prelude::*;
    use serde_json::Value;
    use shared_types::{ChainSide, Hash};

    const NONCE: u64 = 7;
    const AMOUNT: u64 = 250;

    /// Emits `event` `copies` times, syncing after each copy or once at the end.
    async fn deliver(
        h: &Harness,
        side: ChainSide,
        kind: EntityKind,
        block: u64,
        event: Value,
        copies: usize,
        sync_each: bool,
    ) {
        for _ in 0..copies {
            h.emit(side, kind, block, event.clone());
            if sync_each {
                h.sync().await;
            }
        }
        h.sync().await;
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_duplicates_never_cost_extra_transactions(
            copies in proptest::collection::vec(1usize..=3, 7),
            sync_each in any::<bool>(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let h = Harness::new().await;
                let origin_gateway = h.config.origin.gateway_address;
                let request_hash = Hash::repeat_byte(0xd1);

                deliver(
                    &h,
                    ChainSide::Origin,
                    EntityKind::StakeRequested,
                    5,
                    events::requested(MessageType::Stake, origin_gateway, request_hash, NONCE, AMOUNT),
                    copies[0],
                    sync_each,
                )
                .await;
                let message_hash = h
                    .repositories()
                    .requests
                    .get(&request_hash)
                    .await
                    .unwrap()
                    .and_then(|r| r.message_hash)
                    .expect("request accepted");
                let hash_lock = h.message(message_hash).await.hash_lock.unwrap();
                let secret = h.message(message_hash).await.secret.unwrap();

                let script = [
                    (
                        ChainSide::Origin,
                        EntityKind::StakeIntentDeclared,
                        10,
                        events::declared(MessageType::Stake, message_hash, NONCE, AMOUNT),
                    ),
                    (
                        ChainSide::Auxiliary,
                        EntityKind::StateRootAvailable,
                        3,
                        events::state_root(12),
                    ),
                    (
                        ChainSide::Auxiliary,
                        EntityKind::GatewayProven,
                        4,
                        events::gateway_proven(origin_gateway, 12),
                    ),
                    (
                        ChainSide::Auxiliary,
                        EntityKind::StakeIntentConfirmed,
                        5,
                        events::confirmed(MessageType::Stake, message_hash, NONCE, AMOUNT, 12, hash_lock),
                    ),
                    (
                        ChainSide::Origin,
                        EntityKind::StakeProgressed,
                        11,
                        events::progressed(MessageType::Stake, message_hash, NONCE, secret),
                    ),
                    (
                        ChainSide::Auxiliary,
                        EntityKind::MintProgressed,
                        6,
                        events::progressed(MessageType::Stake, message_hash, NONCE, secret),
                    ),
                ];
                for ((side, kind, block, event), copies) in script.into_iter().zip(&copies[1..]) {
                    deliver(&h, side, kind, block, event, *copies, sync_each).await;
                }

                let message = h.message(message_hash).await;
                assert_eq!(message.source_status, MessageStatus::Progressed);
                assert_eq!(message.target_status, MessageStatus::Progressed);
                assert_eq!(h.origin.node.sent_count(), 2, "accept + progressStake");
                assert_eq!(h.auxiliary.node.sent_count(), 3, "prove + confirm + progressMint");
            });
        }
    }
}
