use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub fn component_info_metric(name: &'static str) {
    describe_gauge!(names::COMPONENT_INFO, "Basic information about the component");

    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("unknown");
    gauge!(names::COMPONENT_INFO, "component" => name, "version" => version).set(1);
}

/// Installs the Prometheus recorder and describes the workspace's counters.
/// Without a recorder installed every metric call is a no-op.
pub fn install_exporter(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(address)
        .install()?;

    describe_counter!(
        names::TRACES_PROCESSED,
        metrics::Unit::Count,
        "Traces successfully converted to onset sequences"
    );
    describe_counter!(
        names::FAILURES,
        metrics::Unit::Count,
        "Traces which could not be processed, by kind"
    );
    describe_counter!(
        names::EVENTS_ADDED,
        metrics::Unit::Count,
        "Events synthesized during regularization"
    );
    describe_counter!(
        names::EVENTS_REMOVED,
        metrics::Unit::Count,
        "Spurious events dropped during regularization"
    );
    Ok(())
}

pub mod names {
    pub const COMPONENT_INFO: &str = "ttl_timing_component_info";
    pub const TRACES_PROCESSED: &str = "ttl_timing_traces_processed";
    pub const FAILURES: &str = "ttl_timing_failures";
    pub const EVENTS_ADDED: &str = "ttl_timing_events_added";
    pub const EVENTS_REMOVED: &str = "ttl_timing_events_removed";
}

pub mod failures {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        FileReadFailed,
        FileWriteFailed,
        InvalidSample,
        InsufficientData,
        InsufficientSeparation,
        InvalidParameter,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::FileReadFailed => "file_read_failed",
                FailureKind::FileWriteFailed => "file_write_failed",
                FailureKind::InvalidSample => "invalid_sample",
                FailureKind::InsufficientData => "insufficient_data",
                FailureKind::InsufficientSeparation => "insufficient_separation",
                FailureKind::InvalidParameter => "invalid_parameter",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::failures::{FailureKind, get_label};

    #[test]
    fn failure_labels_are_distinct() {
        let kinds = [
            FailureKind::FileReadFailed,
            FailureKind::FileWriteFailed,
            FailureKind::InvalidSample,
            FailureKind::InsufficientData,
            FailureKind::InsufficientSeparation,
            FailureKind::InvalidParameter,
        ];
        let mut labels: Vec<_> = kinds.into_iter().map(|k| get_label(k).1).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), kinds.len());
    }
}
