//! Metrics snapshots and exporters for memoized functions.
//!
//! Enabled with the `metrics` feature.

pub mod exporter;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use traits::{MemoMetricsSnapshot, MetricsExporter, MetricsSnapshotProvider};
