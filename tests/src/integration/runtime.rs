//! # Running Facilitator
//!
//! Push delivery through a started [`Facilitator`]: index pushes trigger
//! sweeps, the dispatch loop applies them and the services react.

#[cfg(test)]
mod tests {
    use crate::harness::{config, events, MockChain};
    use facilitator_runtime::Facilitator;
    use fc_02_storage::{EntityKind, InMemoryKVStore, KeyValueStore, MessageType};
    use serde_json::{json, Value};
    use shared_types::{Address, Hash};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    const WAIT: Duration = Duration::from_secs(5);

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        timeout(WAIT, async {
            while !condition() {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    fn record(kind: EntityKind, contract: Address, uts: u64, block: u64, fields: Value) -> Value {
        let mut raw = fields;
        let object = raw.as_object_mut().unwrap();
        object.insert("id".into(), json!(format!("{kind}-{uts}")));
        object.insert("blockNumber".into(), json!(block.to_string()));
        object.insert("uts".into(), json!(uts.to_string()));
        object.insert("contractAddress".into(), json!(format!("{contract:?}")));
        raw
    }

    fn stake_request(uts: u64, request_hash: Hash) -> Value {
        let config = config();
        record(
            EntityKind::StakeRequested,
            config.origin.request_pool_address,
            uts,
            5,
            events::requested(
                MessageType::Stake,
                config.origin.gateway_address,
                request_hash,
                1,
                100,
            ),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pushed_request_is_accepted() {
        let origin = MockChain::new();
        let auxiliary = MockChain::new();
        let facilitator = Facilitator::new(
            config(),
            Arc::new(InMemoryKVStore::new()),
            origin.ports(),
            auxiliary.ports(),
        );
        facilitator.start().await.unwrap();

        origin
            .index
            .insert(EntityKind::StakeRequested, stake_request(1, Hash::repeat_byte(0xe1)))
            .unwrap();
        let node = origin.node.clone();
        wait_until(move || node.sent_count() == 1).await;

        facilitator.stop().await;
        assert_eq!(origin.index.subscriber_count(), 0);
        assert_eq!(auxiliary.node.sent_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_resumes_from_stored_cursors() {
        let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryKVStore::new());
        let origin = MockChain::new();
        let auxiliary = MockChain::new();

        // Indexed while the facilitator was down; swept on subscribe.
        origin
            .index
            .insert(EntityKind::StakeRequested, stake_request(1, Hash::repeat_byte(0xe2)))
            .unwrap();

        let first = Facilitator::new(config(), store.clone(), origin.ports(), auxiliary.ports());
        first.start().await.unwrap();
        let node = origin.node.clone();
        wait_until(move || node.sent_count() == 1).await;
        first.stop().await;
        let repos = first.container().repositories.clone();
        let link = repos
            .requests
            .get(&Hash::repeat_byte(0xe2))
            .await
            .unwrap()
            .and_then(|r| r.message_hash);
        assert!(link.is_some());

        let second = Facilitator::new(config(), store.clone(), origin.ports(), auxiliary.ports());
        second.start().await.unwrap();
        let cursor = second
            .container()
            .repositories
            .cursors
            .cursor(config().origin.request_pool_address, EntityKind::StakeRequested)
            .await
            .unwrap();
        assert_eq!(cursor, 1);

        origin
            .index
            .insert(EntityKind::StakeRequested, stake_request(2, Hash::repeat_byte(0xe3)))
            .unwrap();
        let node = origin.node.clone();
        wait_until(move || node.sent_count() == 2).await;
        sleep(Duration::from_millis(100)).await;
        second.stop().await;

        // Only the new request was accepted by the second run.
        assert_eq!(origin.node.sent_count(), 2);
        let repos = second.container().repositories.clone();
        let relinked = repos
            .requests
            .get(&Hash::repeat_byte(0xe2))
            .await
            .unwrap()
            .and_then(|r| r.message_hash);
        assert_eq!(relinked, link);
    }
}
