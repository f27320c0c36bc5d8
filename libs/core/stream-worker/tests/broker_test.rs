//! Concurrency tests for `TopicRegistry`.

use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{CancellationToken, TopicRegistry};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_creates_one_topic() {
    let registry = Arc::new(TopicRegistry::new());

    let mut handles = Vec::new();
    for i in 0..16 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry.publish("shared", format!("k{i}"), "v").unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(registry.topics(), vec!["shared".to_string()]);
    assert_eq!(registry.depth("shared"), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_competing_subscribers_each_message_delivered_once() {
    let registry = Arc::new(TopicRegistry::new());
    let cancel = CancellationToken::new();

    let mut consumers = Vec::new();
    for group in ["group-a", "group-b"] {
        let stream = registry.subscribe("work", group, cancel.clone());
        consumers.push(tokio::spawn(async move {
            stream.map(|m| m.key).collect::<Vec<String>>().await
        }));
    }

    for i in 0..100 {
        registry.publish("work", format!("k{i}"), "v").unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.depth("work") > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queue should drain");
    cancel.cancel();

    let mut seen = Vec::new();
    for consumer in consumers {
        let keys = consumer.await.unwrap();
        // Each subscriber still sees its share in publish order.
        let indices: Vec<usize> = keys
            .iter()
            .map(|k| k.trim_start_matches('k').parse().unwrap())
            .collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        seen.extend(keys);
    }

    let unique: HashSet<&String> = seen.iter().collect();
    assert_eq!(seen.len(), 100);
    assert_eq!(unique.len(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_keep_their_own_order() {
    const PUBLISHERS: usize = 6;
    const PER_PUBLISHER: usize = 200;

    let registry = Arc::new(TopicRegistry::new());

    let mut handles = Vec::new();
    for p in 0..PUBLISHERS {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            for i in 0..PER_PUBLISHER {
                registry.publish("fan-in", format!("p{p}-{i}"), "v").unwrap();
                if i % 16 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let total = PUBLISHERS * PER_PUBLISHER;
    assert_eq!(registry.depth("fan-in"), total);

    let stream = registry.subscribe("fan-in", "g", CancellationToken::new());
    let keys: Vec<String> = stream.take(total).map(|m| m.key).collect().await;
    assert_eq!(keys.len(), total);
    assert_eq!(registry.depth("fan-in"), 0);

    let mut per_publisher: Vec<Vec<usize>> = vec![Vec::new(); PUBLISHERS];
    for key in &keys {
        let (p, i) = key.trim_start_matches('p').split_once('-').unwrap();
        per_publisher[p.parse::<usize>().unwrap()].push(i.parse().unwrap());
    }
    for sequence in per_publisher {
        assert_eq!(sequence, (0..PER_PUBLISHER).collect::<Vec<_>>());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_accepted_publish_is_drained_after_close() {
    let registry = Arc::new(TopicRegistry::new());

    let stream = registry.subscribe("closing", "g", CancellationToken::new());
    let consumer = tokio::spawn(async move { stream.count().await });

    let mut publishers = Vec::new();
    for p in 0..4 {
        let registry = Arc::clone(&registry);
        publishers.push(tokio::spawn(async move {
            let mut accepted = 0usize;
            let mut i = 0usize;
            while registry.publish("closing", format!("p{p}-{i}"), "v").is_ok() {
                accepted += 1;
                i += 1;
                if i % 8 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            accepted
        }));
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    registry.close();

    let mut accepted = 0;
    for publisher in publishers {
        accepted += publisher.await.unwrap();
    }

    let consumed = tokio::time::timeout(Duration::from_secs(5), consumer)
        .await
        .expect("subscription should end after close")
        .unwrap();
    assert!(accepted > 0);
    assert_eq!(consumed, accepted);
    assert_eq!(registry.depth("closing"), 0);
}
