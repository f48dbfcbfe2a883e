use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors reported by a transport when a delivery cannot be handed off.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The transport is no longer able to accept deliveries.
    #[error("transport closed: {0}")]
    Closed(String),
    /// The transport accepted the call but refused the delivery.
    #[error("delivery rejected: {0}")]
    Rejected(String),
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Capability for delivering a serialized payload to a monitoring backend.
///
/// `exchange` and `key` name the destination; `routing` is an override that
/// transports supporting per-message routing may apply in place of `key`
/// when non-empty (callers that want default routing pass `""`).
///
/// Implementations must be safe for concurrent use: one transport is
/// typically shared by every scheduler bound to the same client. Delivery
/// failures are reported, never retried here; retry policy belongs to the
/// transport itself or to nobody.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Hand one payload to the transport for delivery.
    async fn publish(
        &self,
        exchange: &str,
        key: &str,
        routing: &str,
        payload: &[u8],
    ) -> Result<(), PublishError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
