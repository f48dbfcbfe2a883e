use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::publisher::{PublishError, Publisher};

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// One published message as observed by a subscriber: the destination
/// naming is carried verbatim alongside the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub exchange: String,
    pub key: String,
    pub routing: String,
    pub payload: Vec<u8>,
}

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// An in-process broadcast transport built on flume channels.
///
/// Every [`subscribe`](MemoryTransport::subscribe) call registers a new
/// receiver that observes all deliveries published afterwards. Publishing
/// with zero subscribers succeeds; disconnected subscribers are pruned on
/// the next publish. The transport is cheap to clone (the subscriber
/// registry lives behind an `Arc`) and safe for concurrent use by any
/// number of schedulers.
#[derive(Clone)]
pub struct MemoryTransport {
    subscribers: Arc<Mutex<Vec<flume::Sender<Delivery>>>>,
}

impl MemoryTransport {
    /// Create a new transport with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> flume::Receiver<Delivery> {
        let (tx, rx) = flume::unbounded();
        let mut subscribers = self
            .subscribers
            .lock()
            .expect("MemoryTransport lock poisoned");
        subscribers.push(tx);
        rx
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        let subscribers = self
            .subscribers
            .lock()
            .expect("MemoryTransport lock poisoned");
        subscribers.len()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for MemoryTransport {
    async fn publish(
        &self,
        exchange: &str,
        key: &str,
        routing: &str,
        payload: &[u8],
    ) -> Result<(), PublishError> {
        let delivery = Delivery {
            exchange: exchange.to_string(),
            key: key.to_string(),
            routing: routing.to_string(),
            payload: payload.to_vec(),
        };

        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| PublishError::Closed("subscriber registry poisoned".to_string()))?;
        subscribers.retain(|tx| tx.send(delivery.clone()).is_ok());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_observes_delivery_fields() {
        let bus = MemoryTransport::new();
        let rx = bus.subscribe();

        bus.publish("direct", "results", "", b"{}").await.unwrap();

        let delivery = rx.recv_async().await.unwrap();
        assert_eq!(delivery.exchange, "direct");
        assert_eq!(delivery.key, "results");
        assert_eq!(delivery.routing, "");
        assert_eq!(delivery.payload, b"{}");
    }

    #[tokio::test]
    async fn fans_out_to_every_subscriber() {
        let bus = MemoryTransport::new();
        let rx1 = bus.subscribe();
        let rx2 = bus.subscribe();

        bus.publish("direct", "results", "", b"payload")
            .await
            .unwrap();

        assert_eq!(rx1.recv_async().await.unwrap().payload, b"payload");
        assert_eq!(rx2.recv_async().await.unwrap().payload, b"payload");
    }

    #[tokio::test]
    async fn publish_without_subscribers_succeeds() {
        let bus = MemoryTransport::new();
        bus.publish("direct", "results", "", b"dropped")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn prunes_disconnected_subscribers() {
        let bus = MemoryTransport::new();
        let keep = bus.subscribe();
        let gone = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(gone);
        bus.publish("direct", "results", "", b"x").await.unwrap();

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.recv_async().await.unwrap().payload, b"x");
    }

    #[tokio::test]
    async fn usable_through_the_publisher_trait_object() {
        let bus = MemoryTransport::new();
        let rx = bus.subscribe();
        let publisher: Arc<dyn Publisher> = Arc::new(bus);

        publisher
            .publish("direct", "results", "override-key", b"bytes")
            .await
            .unwrap();

        let delivery = rx.recv_async().await.unwrap();
        assert_eq!(delivery.routing, "override-key");
    }

    #[tokio::test]
    async fn concurrent_publishers_all_deliver() {
        let bus = MemoryTransport::new();
        let rx = bus.subscribe();

        let a = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.publish("direct", "results", "", b"a").await })
        };
        let b = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.publish("direct", "results", "", b"b").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let mut seen = vec![
            rx.recv_async().await.unwrap().payload,
            rx.recv_async().await.unwrap().payload,
        ];
        seen.sort();
        assert_eq!(seen, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
