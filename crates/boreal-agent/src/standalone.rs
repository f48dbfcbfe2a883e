use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use boreal_core::check::{Check, ExternalCheck};
use boreal_core::types::status_label;
use boreal_transport::publisher::PublishError;
use chrono::Utc;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::client::ClientHandle;
use crate::config::{Attributes, ConfigError, StandaloneConfig};
use crate::result::{ResultEnvelope, RESULTS_EXCHANGE, RESULTS_KEY, RESULTS_ROUTING};
use crate::shutdown::ShutdownSignal;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("check '{check}' is not bound to a client")]
    NotBound { check: String },
    #[error("check '{check}' is already running")]
    AlreadyRunning { check: String },
    #[error("check '{check}' was stopped and cannot be restarted")]
    Stopped { check: String },
}

pub type Result<T> = std::result::Result<T, StartError>;

/// Failure within one tick. Warn-logged and counted by the loop, never
/// surfaced to the caller of [`Standalone::start`].
#[derive(Debug, Error)]
pub enum TickError {
    #[error("encode result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("publish result: {0}")]
    Publish(#[from] PublishError),
}

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

// Idle -> Running -> Stopped; Stopped is terminal.
const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

const EXECUTED_TOTAL: &str = "checks_executed_total";
const ENCODE_FAILURES: &str = "check_encode_failures_total";
const PUBLISH_FAILURES: &str = "check_publish_failures_total";
const RUNNING_GAUGE: &str = "standalone_checks_running";

// ---------------------------------------------------------------------------
// Standalone
// ---------------------------------------------------------------------------

/// A self-scheduling check: runs one [`Check`] on a fixed interval and
/// publishes every result through the bound client's transport.
///
/// Lifecycle: construct, [`bind`](Standalone::bind) a client, spawn
/// [`start`](Standalone::start) on its own task, and eventually request
/// termination through [`shutdown`](Standalone::shutdown) or a handle from
/// [`shutdown_handle`](Standalone::shutdown_handle). Each instance runs at
/// most one loop, ever: a second `start` while running is rejected, as is a
/// `start` after the loop exited.
pub struct Standalone {
    name: String,
    check: Option<Arc<dyn Check>>,
    interval: Option<Duration>,
    client: Option<Arc<ClientHandle>>,
    shutdown: ShutdownSignal,
    state: AtomicU8,
}

impl std::fmt::Debug for Standalone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Standalone")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("bound", &self.client.is_some())
            .field("state", &self.state.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl Standalone {
    /// Build a scheduler from a validated configuration. A configured
    /// `command` becomes an [`ExternalCheck`]; whether missing pieces are
    /// fatal is decided at start time.
    pub fn new(name: impl Into<String>, config: StandaloneConfig) -> Self {
        let check: Option<Arc<dyn Check>> = config
            .command
            .as_deref()
            .map(|cmd| Arc::new(ExternalCheck::new(cmd)) as Arc<dyn Check>);
        Self {
            name: name.into(),
            check,
            interval: config.interval_duration(),
            client: None,
            shutdown: ShutdownSignal::new(),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Build a scheduler straight from a loosely-typed attribute map.
    pub fn from_attributes(
        name: impl Into<String>,
        attributes: &Attributes,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(name, StandaloneConfig::from_attributes(attributes)?))
    }

    /// Build a scheduler around an arbitrary check capability instead of a
    /// shell command.
    pub fn with_check(
        name: impl Into<String>,
        check: Arc<dyn Check>,
        interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            check: Some(check),
            interval: Some(interval),
            client: None,
            shutdown: ShutdownSignal::new(),
            state: AtomicU8::new(IDLE),
        }
    }

    /// Attach the client this scheduler publishes through. Must happen
    /// before [`start`](Standalone::start).
    pub fn bind(&mut self, client: Arc<ClientHandle>) {
        self.client = Some(client);
    }

    /// The configured check name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured interval, if one is usable for scheduling.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Whether the timing loop is currently active.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Request loop termination. Idempotent, never blocks, and is a no-op
    /// if the loop already exited (or never started).
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// A cloneable handle for requesting termination from another task.
    pub fn shutdown_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Run the schedule until termination is requested.
    ///
    /// Blocks for the lifetime of the schedule and is expected to occupy
    /// its own task. Preconditions (a check, a positive interval, a bound
    /// client) are verified before any state transition; after them the
    /// only return is `Ok(())` on shutdown. Per-tick failures are logged
    /// and counted, never propagated.
    pub async fn start(&self) -> Result<()> {
        let check = self.check.clone().ok_or_else(|| ConfigError::NoCommand {
            check: self.name.clone(),
        })?;
        let interval = self
            .interval
            .filter(|i| !i.is_zero())
            .ok_or_else(|| ConfigError::NoInterval {
                check: self.name.clone(),
            })?;
        let client = self.client.clone().ok_or_else(|| StartError::NotBound {
            check: self.name.clone(),
        })?;

        match self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => {}
            Err(state) if state == RUNNING => {
                return Err(StartError::AlreadyRunning {
                    check: self.name.clone(),
                })
            }
            Err(_) => {
                return Err(StartError::Stopped {
                    check: self.name.clone(),
                })
            }
        }

        let mut shutdown_rx = self.shutdown.subscribe();
        // A termination requested before start wins over the first tick.
        if self.shutdown.is_triggered() {
            self.state.store(STOPPED, Ordering::SeqCst);
            info!(check = %self.name, "standalone stopped before first tick");
            return Ok(());
        }

        let metrics = client.metrics().clone();
        metrics.gauge_add(RUNNING_GAUGE, 1);
        info!(
            check = %self.name,
            interval_secs = interval.as_secs_f64(),
            "standalone schedule started"
        );

        let mut ticker = tokio::time::interval(interval);
        // Skip instead of burst when ticks were missed: a slow check delays
        // the next observation, it never replays the backlog.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Consume the immediate tick so the first fire lands one period in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let issued = Utc::now().timestamp();
                    metrics.incr(EXECUTED_TOTAL, &[("check", &self.name)]);
                    if let Err(err) = self.tick(issued, check.as_ref(), &client).await {
                        let failure = match &err {
                            TickError::Encode(_) => ENCODE_FAILURES,
                            TickError::Publish(_) => PUBLISH_FAILURES,
                        };
                        metrics.incr(failure, &[("check", &self.name)]);
                        warn!(check = %self.name, error = %err, "tick failed");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }

        self.state.store(STOPPED, Ordering::SeqCst);
        metrics.gauge_add(RUNNING_GAUGE, -1);
        info!(check = %self.name, "standalone schedule stopped");
        Ok(())
    }

    /// One tick: execute the check, wrap the result, publish it.
    ///
    /// Awaited inline by the loop, so ticks for one instance are strictly
    /// serialized and never overlap with shutdown observation.
    async fn tick(
        &self,
        issued: i64,
        check: &dyn Check,
        client: &ClientHandle,
    ) -> std::result::Result<(), TickError> {
        let output = check.execute().await;
        debug!(
            check = %self.name,
            status = output.status,
            severity = status_label(output.status),
            duration_secs = output.duration,
            "check executed"
        );

        let envelope = ResultEnvelope::new(client.name(), &self.name, issued, &output);
        let payload = serde_json::to_vec(&envelope)?;

        client
            .transport()
            .publish(RESULTS_EXCHANGE, RESULTS_KEY, RESULTS_ROUTING, &payload)
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use boreal_transport::memory::MemoryTransport;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test attributes must be an object"),
        }
    }

    fn test_client() -> Arc<ClientHandle> {
        Arc::new(ClientHandle::new("host-1", Arc::new(MemoryTransport::new())))
    }

    #[tokio::test]
    async fn start_without_command_is_a_config_error() {
        let mut standalone =
            Standalone::from_attributes("disk", &attrs(json!({"interval": 10}))).unwrap();
        standalone.bind(test_client());

        match standalone.start().await {
            Err(StartError::Config(ConfigError::NoCommand { check })) => {
                assert_eq!(check, "disk")
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!standalone.is_running());
    }

    #[tokio::test]
    async fn start_without_interval_is_a_config_error() {
        let mut standalone =
            Standalone::from_attributes("disk", &attrs(json!({"command": "true"}))).unwrap();
        standalone.bind(test_client());

        match standalone.start().await {
            Err(StartError::Config(ConfigError::NoInterval { check })) => {
                assert_eq!(check, "disk")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_positive_interval_is_a_config_error() {
        let mut standalone = Standalone::from_attributes(
            "disk",
            &attrs(json!({"command": "true", "interval": 0})),
        )
        .unwrap();
        standalone.bind(test_client());

        assert!(matches!(
            standalone.start().await,
            Err(StartError::Config(ConfigError::NoInterval { .. }))
        ));
    }

    #[tokio::test]
    async fn start_without_bind_fails_fast() {
        let standalone = Standalone::from_attributes(
            "disk",
            &attrs(json!({"command": "true", "interval": 10})),
        )
        .unwrap();

        match standalone.start().await {
            Err(StartError::NotBound { check }) => assert_eq!(check, "disk"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn precondition_failure_leaves_instance_idle() {
        let standalone = Standalone::from_attributes(
            "disk",
            &attrs(json!({"command": "true", "interval": 10})),
        )
        .unwrap();

        // NotBound does not consume the instance: binding afterwards must
        // still allow a start (verified by reaching the shutdown path).
        assert!(standalone.start().await.is_err());
        assert_eq!(standalone.state.load(Ordering::SeqCst), IDLE);
    }

    #[tokio::test]
    async fn shutdown_before_start_prevents_any_tick() {
        let mut standalone = Standalone::from_attributes(
            "disk",
            &attrs(json!({"command": "true", "interval": 0.01})),
        )
        .unwrap();
        let transport = MemoryTransport::new();
        let rx = transport.subscribe();
        standalone.bind(Arc::new(ClientHandle::new("host-1", Arc::new(transport))));

        standalone.shutdown();
        standalone.start().await.unwrap();

        assert!(rx.try_recv().is_err(), "no tick should have published");
        assert_eq!(standalone.state.load(Ordering::SeqCst), STOPPED);
    }

    #[tokio::test]
    async fn restart_after_stop_is_rejected() {
        let mut standalone = Standalone::from_attributes(
            "disk",
            &attrs(json!({"command": "true", "interval": 10})),
        )
        .unwrap();
        standalone.bind(test_client());

        standalone.shutdown();
        standalone.start().await.unwrap();

        match standalone.start().await {
            Err(StartError::Stopped { check }) => assert_eq!(check, "disk"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn wrong_typed_attribute_fails_construction() {
        let err = Standalone::from_attributes("disk", &attrs(json!({"command": 1}))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { key: "command", .. }));
    }

    #[test]
    fn error_messages_name_the_check() {
        let err = StartError::NotBound {
            check: "disk".to_string(),
        };
        assert_eq!(err.to_string(), "check 'disk' is not bound to a client");

        let err = StartError::Config(ConfigError::NoCommand {
            check: "disk".to_string(),
        });
        assert_eq!(err.to_string(), "no command for check 'disk'");
    }
}
