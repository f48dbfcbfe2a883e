use boreal_core::types::CheckOutput;
use serde::{Deserialize, Serialize};

/// Exchange every check result is published to.
pub const RESULTS_EXCHANGE: &str = "direct";
/// Routing key for check results.
pub const RESULTS_KEY: &str = "results";
/// Routing override; empty means the transport's default routing applies.
pub const RESULTS_ROUTING: &str = "";

// ---------------------------------------------------------------------------
// Wire payload
// ---------------------------------------------------------------------------

/// One check execution as published on the wire.
///
/// `issued` is the tick time stamped by the scheduler when the timer fired;
/// `executed` is the completion stamp from the check itself. The two differ
/// by at least the check's run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub issued: i64,
    pub output: String,
    pub duration: f64,
    pub status: i32,
    pub executed: i64,
}

/// The published result envelope: which client saw what.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub client: String,
    pub check: CheckResult,
}

impl ResultEnvelope {
    /// Build the envelope for one tick, passing the check output fields
    /// through verbatim.
    pub fn new(client: &str, name: &str, issued: i64, output: &CheckOutput) -> Self {
        Self {
            client: client.to_string(),
            check: CheckResult {
                name: name.to_string(),
                issued,
                output: output.output.clone(),
                duration: output.duration,
                status: output.status,
                executed: output.executed,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_to_wire_shape() {
        let output = CheckOutput {
            output: "OK".to_string(),
            duration: 0.5,
            status: 0,
            executed: 1002,
        };
        let envelope = ResultEnvelope::new("host-1", "disk", 1000, &output);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({
                "client": "host-1",
                "check": {
                    "name": "disk",
                    "issued": 1000,
                    "output": "OK",
                    "duration": 0.5,
                    "status": 0,
                    "executed": 1002
                }
            })
        );
    }

    #[test]
    fn envelope_round_trips() {
        let output = CheckOutput {
            output: "load average 4.2".to_string(),
            duration: 1.25,
            status: 2,
            executed: 1_700_000_050,
        };
        let envelope = ResultEnvelope::new("host-2", "load", 1_700_000_049, &output);

        let bytes = serde_json::to_vec(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, envelope);
    }
}
