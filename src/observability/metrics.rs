//! Metrics for the provenance chart pipeline
//!
//! Metric names live in [`MetricName`] so call sites never spell them out.
//! Recording is a no-op until [`init`] installs the Prometheus recorder.

use std::fmt;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use crate::error::{ChartError, Result};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Asset loading
    AssetsFetched,
    AssetsFailed,
    AssetBytes,

    // Filter
    FilterEntriesKept,
    FilterEntriesDropped,

    // Normalize
    NormalizeRecords,
    NormalizeDuplicatesMerged,
    NormalizeDateParseFailures,

    // Aggregation
    AggregateUnmatchedValues,

    // Export
    ChartsWritten,
    ChartsSkipped,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::AssetsFetched => "provenance_assets_fetched_total",
            MetricName::AssetsFailed => "provenance_assets_failed_total",
            MetricName::AssetBytes => "provenance_asset_bytes",
            MetricName::FilterEntriesKept => "provenance_filter_entries_kept_total",
            MetricName::FilterEntriesDropped => "provenance_filter_entries_dropped_total",
            MetricName::NormalizeRecords => "provenance_normalize_records_total",
            MetricName::NormalizeDuplicatesMerged => "provenance_normalize_duplicates_merged_total",
            MetricName::NormalizeDateParseFailures => "provenance_normalize_date_parse_failures_total",
            MetricName::AggregateUnmatchedValues => "provenance_aggregate_unmatched_values_total",
            MetricName::ChartsWritten => "provenance_charts_written_total",
            MetricName::ChartsSkipped => "provenance_charts_skipped_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            AssetsFetched,
            AssetsFailed,
            AssetBytes,
            FilterEntriesKept,
            FilterEntriesDropped,
            NormalizeRecords,
            NormalizeDuplicatesMerged,
            NormalizeDateParseFailures,
            AggregateUnmatchedValues,
            ChartsWritten,
            ChartsSkipped,
        ]
        .into_iter()
    }

    /// Returns (phase, description, unit)
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        match self {
            MetricName::AssetsFetched => ("assets", "Assets loaded from files or URLs", None),
            MetricName::AssetsFailed => ("assets", "Asset loads that failed", None),
            MetricName::AssetBytes => ("assets", "Size of loaded assets", Some("bytes")),
            MetricName::FilterEntriesKept => ("filter", "Registry entries kept by the filter", None),
            MetricName::FilterEntriesDropped => ("filter", "Registry entries dropped by the filter", None),
            MetricName::NormalizeRecords => ("normalize", "Normalized records produced", None),
            MetricName::NormalizeDuplicatesMerged => ("normalize", "Entries merged into an earlier record", None),
            MetricName::NormalizeDateParseFailures => ("normalize", "Provenance dates that failed to parse", None),
            MetricName::AggregateUnmatchedValues => ("aggregate", "Values with no reference-table match", None),
            MetricName::ChartsWritten => ("export", "Chart documents written", None),
            MetricName::ChartsSkipped => ("export", "Charts skipped for missing inputs", None),
        }
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder for this process
pub fn init() -> Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ChartError::Config(format!("Failed to install Prometheus recorder: {}", e)))?;
    METRICS_HANDLE.set(handle).ok();

    for metric in MetricName::all_metrics() {
        let (_, description, unit) = metric.metadata();
        match unit {
            Some(_) => ::metrics::describe_histogram!(metric.as_str(), ::metrics::Unit::Bytes, description),
            None => ::metrics::describe_counter!(metric.as_str(), description),
        }
    }
    info!("Metrics recorder installed");
    Ok(())
}

/// Render the current metrics snapshot in the Prometheus text format
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

pub mod assets {
    use super::MetricName;

    pub fn fetched(kind: &'static str, bytes: usize) {
        ::metrics::counter!(MetricName::AssetsFetched.as_str(), "kind" => kind).increment(1);
        ::metrics::histogram!(MetricName::AssetBytes.as_str(), "kind" => kind).record(bytes as f64);
    }

    pub fn failed(kind: &'static str) {
        ::metrics::counter!(MetricName::AssetsFailed.as_str(), "kind" => kind).increment(1);
    }
}

pub mod filter {
    use super::MetricName;

    pub fn entries_filtered(kept: usize, dropped: usize) {
        ::metrics::counter!(MetricName::FilterEntriesKept.as_str()).increment(kept as u64);
        ::metrics::counter!(MetricName::FilterEntriesDropped.as_str()).increment(dropped as u64);
    }
}

pub mod normalize {
    use super::MetricName;

    pub fn records_normalized(count: usize) {
        ::metrics::counter!(MetricName::NormalizeRecords.as_str()).increment(count as u64);
    }

    pub fn duplicate_merged() {
        ::metrics::counter!(MetricName::NormalizeDuplicatesMerged.as_str()).increment(1);
    }

    pub fn date_parse_failed() {
        ::metrics::counter!(MetricName::NormalizeDateParseFailures.as_str()).increment(1);
    }
}

pub mod aggregate {
    use super::MetricName;

    pub fn unmatched(chart: &'static str, count: usize) {
        ::metrics::counter!(MetricName::AggregateUnmatchedValues.as_str(), "chart" => chart)
            .increment(count as u64);
    }
}

pub mod export {
    use super::MetricName;

    pub fn chart_written(kind: &'static str) {
        ::metrics::counter!(MetricName::ChartsWritten.as_str(), "kind" => kind).increment(1);
    }

    pub fn chart_skipped(kind: &'static str) {
        ::metrics::counter!(MetricName::ChartsSkipped.as_str(), "kind" => kind).increment(1);
    }
}
