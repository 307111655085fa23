use std::io::Write;

use parking_lot::Mutex;

use crate::memo::CacheInfo;
use crate::metrics::traits::{MemoMetricsSnapshot, MetricsExporter};
use crate::store::traits::StoreMetrics;

/// Prometheus text exporter for memoization snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector. Write
/// failures are ignored; a broken sink must not break the memoized function.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_sample(&self, kind: &str, name: &str, labels: &str, value: u64) {
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{}{} {}", name, labels, value);
    }

    fn write_counter(&self, name: &str, labels: &str, value: u64) {
        self.write_sample("counter", name, labels, value);
    }

    fn write_gauge(&self, name: &str, labels: &str, value: u64) {
        self.write_sample("gauge", name, labels, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

fn store_label(store_kind: &str) -> String {
    let escaped = store_kind.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{{store=\"{}\"}}", escaped)
}

impl<W: Write + Send> MetricsExporter<CacheInfo> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheInfo) {
        let labels = store_label(&snapshot.store_kind);
        self.write_counter(&self.metric_name("hits_total"), &labels, snapshot.hits);
        self.write_counter(&self.metric_name("misses_total"), &labels, snapshot.misses);
        self.write_gauge(
            &self.metric_name("current_size"),
            &labels,
            snapshot.current_size as u64,
        );
        // unbounded stores have no capacity sample
        if let Some(capacity) = snapshot.max_capacity {
            self.write_gauge(&self.metric_name("max_capacity"), &labels, capacity as u64);
        }
    }
}

impl<W: Write + Send> MetricsExporter<StoreMetrics> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &StoreMetrics) {
        self.write_counter(&self.metric_name("store_hits_total"), "", snapshot.hits);
        self.write_counter(&self.metric_name("store_misses_total"), "", snapshot.misses);
        self.write_counter(&self.metric_name("store_inserts_total"), "", snapshot.inserts);
        self.write_counter(&self.metric_name("store_updates_total"), "", snapshot.updates);
        self.write_counter(&self.metric_name("store_removes_total"), "", snapshot.removes);
        self.write_counter(
            &self.metric_name("store_evictions_total"),
            "",
            snapshot.evictions,
        );
        self.write_counter(
            &self.metric_name("store_rejections_total"),
            "",
            snapshot.rejections,
        );
    }
}

impl<W: Write + Send> MetricsExporter<MemoMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &MemoMetricsSnapshot) {
        MetricsExporter::<CacheInfo>::export(self, &snapshot.info);
        MetricsExporter::<StoreMetrics>::export(self, &snapshot.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(max_capacity: Option<usize>) -> CacheInfo {
        CacheInfo {
            store_kind: "LruStore".to_string(),
            hits: 7,
            misses: 3,
            max_capacity,
            current_size: 3,
        }
    }

    fn render<S>(prefix: &str, snapshot: &S) -> String
    where
        PrometheusTextExporter<Vec<u8>>: MetricsExporter<S>,
    {
        let exporter = PrometheusTextExporter::new(prefix, Vec::new());
        MetricsExporter::<S>::export(&exporter, snapshot);
        String::from_utf8(exporter.into_inner()).unwrap()
    }

    #[test]
    fn cache_info_is_labelled_by_store() {
        let text = render("memo", &info(Some(16)));
        assert!(text.contains("# TYPE memo_hits_total counter\n"));
        assert!(text.contains("memo_hits_total{store=\"LruStore\"} 7\n"));
        assert!(text.contains("memo_misses_total{store=\"LruStore\"} 3\n"));
        assert!(text.contains("# TYPE memo_current_size gauge\n"));
        assert!(text.contains("memo_max_capacity{store=\"LruStore\"} 16\n"));
    }

    #[test]
    fn unbounded_store_omits_capacity() {
        let text = render("", &info(None));
        assert!(text.contains("hits_total{store=\"LruStore\"} 7\n"));
        assert!(!text.contains("max_capacity"));
    }

    #[test]
    fn combined_snapshot_exports_both_halves() {
        let snapshot = MemoMetricsSnapshot {
            info: info(None),
            store: StoreMetrics {
                evictions: 2,
                rejections: 1,
                ..StoreMetrics::default()
            },
        };
        let text = render("memo", &snapshot);
        assert!(text.contains("memo_hits_total{store=\"LruStore\"} 7\n"));
        assert!(text.contains("memo_store_evictions_total 2\n"));
        assert!(text.contains("memo_store_rejections_total 1\n"));
    }

    #[test]
    fn label_values_are_escaped() {
        assert_eq!(store_label("a\"b"), "{store=\"a\\\"b\"}");
    }
}
