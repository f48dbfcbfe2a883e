use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

/// Check passed.
pub const STATUS_OK: i32 = 0;
/// Check detected a condition worth attention but not yet failing.
pub const STATUS_WARNING: i32 = 1;
/// Check failed.
pub const STATUS_CRITICAL: i32 = 2;
/// Check could not determine a result (spawn failure, timeout, signal).
pub const STATUS_UNKNOWN: i32 = 3;

/// Human-readable severity label for a status code, for log fields.
///
/// Codes outside the plugin convention (e.g. a raw exit code 127) are
/// reported as `"other"`; the numeric code still travels verbatim in the
/// published result.
pub fn status_label(status: i32) -> &'static str {
    match status {
        STATUS_OK => "ok",
        STATUS_WARNING => "warning",
        STATUS_CRITICAL => "critical",
        STATUS_UNKNOWN => "unknown",
        _ => "other",
    }
}

// ---------------------------------------------------------------------------
// CheckOutput
// ---------------------------------------------------------------------------

/// Immutable result of one check execution.
///
/// `executed` is stamped by the check implementation when execution
/// completes; it is distinct from the scheduler's tick time, which travels
/// separately as `issued` in the published result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Captured text output of the check.
    pub output: String,
    /// Wall-clock execution time in seconds.
    pub duration: f64,
    /// Exit status: 0 ok, 1 warning, 2 critical, 3 unknown; arbitrary
    /// process exit codes pass through verbatim.
    pub status: i32,
    /// Unix seconds at execution completion.
    pub executed: i64,
}

impl CheckOutput {
    /// Returns `true` when the check reported the ok status.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
