//! Dispatch metrics for Heron.
//!
//! Metrics are recorded through the `metrics` facade. Heron installs no
//! recorder of its own: the embedding application chooses an exporter,
//! and without one every call here is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `heron_dispatch_total` | Counter | `controller`, `action`, `status` | Completed dispatches |
//! | `heron_dispatch_duration_seconds` | Histogram | `controller`, `action` | Dispatch latency |
//! | `heron_error_cascade_total` | Counter | `level` | Error cascade entries by level |
//! | `heron_in_flight_dispatches` | Gauge | - | Dispatches currently running |
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use heron_telemetry::metrics::{record_cascade, record_dispatch, CascadeLevel};
//!
//! record_dispatch("Book", "show", 200, Duration::from_millis(3));
//! record_cascade(CascadeLevel::Handler);
//! ```

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::Once;
use std::time::Duration;

/// Completed dispatch counter.
pub const DISPATCH_TOTAL: &str = "heron_dispatch_total";

/// Dispatch latency histogram.
pub const DISPATCH_DURATION_SECONDS: &str = "heron_dispatch_duration_seconds";

/// Error cascade counter.
pub const ERROR_CASCADE_TOTAL: &str = "heron_error_cascade_total";

/// In-flight dispatch gauge.
pub const IN_FLIGHT_DISPATCHES: &str = "heron_in_flight_dispatches";

static DESCRIBED: Once = Once::new();

/// Stage of the error cascade that handled an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeLevel {
    /// The error was logged and a status derived.
    Status,
    /// A controller error action produced the response.
    Handler,
    /// The error action itself failed.
    Fallback,
}

impl CascadeLevel {
    /// Returns the numeric level used as a metric label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "0",
            Self::Handler => "1",
            Self::Fallback => "2",
        }
    }
}

impl std::fmt::Display for CascadeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registers descriptions for all standard metrics.
///
/// Safe to call more than once; descriptions are only registered the
/// first time.
pub fn describe_metrics() {
    DESCRIBED.call_once(|| {
        describe_counter!(DISPATCH_TOTAL, "Total number of completed dispatches");
        describe_histogram!(
            DISPATCH_DURATION_SECONDS,
            metrics::Unit::Seconds,
            "Dispatch duration in seconds"
        );
        describe_counter!(
            ERROR_CASCADE_TOTAL,
            "Errors handled by the error cascade, by level"
        );
        describe_gauge!(IN_FLIGHT_DISPATCHES, "Dispatches currently running");
    });
}

/// Records a completed dispatch.
///
/// Updates `heron_dispatch_total` and `heron_dispatch_duration_seconds`.
pub fn record_dispatch(controller: &str, action: &str, status_code: u16, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "controller" => controller.to_string(),
        "action" => action.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        DISPATCH_DURATION_SECONDS,
        "controller" => controller.to_string(),
        "action" => action.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records an error reaching a cascade level.
pub fn record_cascade(level: CascadeLevel) {
    counter!(ERROR_CASCADE_TOTAL, "level" => level.as_str()).increment(1);
}

/// Guard that tracks a running dispatch in the in-flight gauge.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_DISPATCHES).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_DISPATCHES).decrement(1.0);
    }
}
