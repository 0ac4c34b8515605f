//! Metrics for the connectors, recorded through the `metrics` facade.
//!
//! Nothing is exported unless the host installs a recorder, so every call
//! here is a cheap no-op in a plain CLI run.

use std::fmt;

/// All metric names used by the connectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Request layer
    RequestAttempts,
    RequestFailures,
    RequestDuration,
    ResponsePayloadBytes,

    // Reshape
    ReshapeRowsIn,
    ReshapeRowsMelted,

    // Emission
    RecordsEmitted,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RequestAttempts => "adaptive_request_attempts_total",
            MetricName::RequestFailures => "adaptive_request_failures_total",
            MetricName::RequestDuration => "adaptive_request_duration_seconds",
            MetricName::ResponsePayloadBytes => "adaptive_response_payload_bytes",
            MetricName::ReshapeRowsIn => "adaptive_reshape_rows_in_total",
            MetricName::ReshapeRowsMelted => "adaptive_reshape_rows_melted_total",
            MetricName::RecordsEmitted => "adaptive_records_emitted_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Request Metrics
// ============================================================================

pub mod requests {
    use super::MetricName;

    pub fn attempt() {
        ::metrics::counter!(MetricName::RequestAttempts.as_str()).increment(1);
    }

    /// Record a failed attempt, labelled with the transport failure kind
    pub fn failure(kind: &str) {
        ::metrics::counter!(MetricName::RequestFailures.as_str(), "kind" => kind.to_string())
            .increment(1);
    }

    pub fn duration(secs: f64) {
        ::metrics::histogram!(MetricName::RequestDuration.as_str()).record(secs);
    }

    pub fn payload_bytes(bytes: usize) {
        ::metrics::histogram!(MetricName::ResponsePayloadBytes.as_str()).record(bytes as f64);
    }
}

// ============================================================================
// Reshape Metrics
// ============================================================================

pub mod reshape {
    use super::MetricName;

    pub fn rows_in(count: usize) {
        ::metrics::counter!(MetricName::ReshapeRowsIn.as_str()).increment(count as u64);
    }

    pub fn rows_melted(count: usize) {
        ::metrics::counter!(MetricName::ReshapeRowsMelted.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Emission Metrics
// ============================================================================

pub mod records {
    use super::MetricName;

    pub fn emitted(stream: &str) {
        ::metrics::counter!(MetricName::RecordsEmitted.as_str(), "stream" => stream.to_string())
            .increment(1);
    }
}
