use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::app::load_use_case::ChartInputs;
use crate::app::normalize_use_case::NormalizeUseCase;
use crate::app::ports::ChartOutputPort;
use crate::constants::*;
use crate::error::{ChartError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::aggregate::{
    collection_table, compute_summary_metrics, count_by_parent_child, creator_map,
    group_by_category_into_hierarchy, inspect_dataset, language_map, source_tree,
    text_metric_scatter, WorldMap,
};
use crate::pipeline::processing::normalize::{NormalizedDatasetRecord, RecordField};
use crate::types::{GroupTable, RawRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Normalized,
    TasksSunburst,
    CreatorSunburst,
    LicenseTopics,
    LanguageMap,
    CreatorMap,
    SourceTree,
    TextMetricsLicenses,
    TextMetricsSynthetic,
    SummaryMetrics,
    CollectionTable,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Normalized => NORMALIZED_CHART,
            ChartKind::TasksSunburst => TASKS_SUNBURST_CHART,
            ChartKind::CreatorSunburst => CREATOR_SUNBURST_CHART,
            ChartKind::LicenseTopics => LICENSE_TOPICS_CHART,
            ChartKind::LanguageMap => LANGUAGE_MAP_CHART,
            ChartKind::CreatorMap => CREATOR_MAP_CHART,
            ChartKind::SourceTree => SOURCE_TREE_CHART,
            ChartKind::TextMetricsLicenses => TEXT_METRICS_LICENSES_CHART,
            ChartKind::TextMetricsSynthetic => TEXT_METRICS_SYNTHETIC_CHART,
            ChartKind::SummaryMetrics => SUMMARY_METRICS_CHART,
            ChartKind::CollectionTable => COLLECTION_TABLE_CHART,
        }
    }

    /// Every chart kind in export order
    pub fn all() -> impl Iterator<Item = ChartKind> {
        get_chart_kinds().into_iter().filter_map(|kind| kind.parse().ok())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s {
            NORMALIZED_CHART => ChartKind::Normalized,
            TASKS_SUNBURST_CHART => ChartKind::TasksSunburst,
            CREATOR_SUNBURST_CHART => ChartKind::CreatorSunburst,
            LICENSE_TOPICS_CHART => ChartKind::LicenseTopics,
            LANGUAGE_MAP_CHART => ChartKind::LanguageMap,
            CREATOR_MAP_CHART => ChartKind::CreatorMap,
            SOURCE_TREE_CHART => ChartKind::SourceTree,
            TEXT_METRICS_LICENSES_CHART => ChartKind::TextMetricsLicenses,
            TEXT_METRICS_SYNTHETIC_CHART => ChartKind::TextMetricsSynthetic,
            SUMMARY_METRICS_CHART => ChartKind::SummaryMetrics,
            COLLECTION_TABLE_CHART => ChartKind::CollectionTable,
            other => {
                return Err(ChartError::Config(format!(
                    "Unknown chart kind '{}', expected one of {:?}",
                    other,
                    get_chart_kinds()
                )))
            }
        };
        Ok(kind)
    }
}

/// Outcome of an export run
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<ChartKind>,
    /// Charts left out, with the input they were missing
    pub skipped: Vec<(ChartKind, String)>,
}

fn require<'a, T>(table: Option<&'a T>, name: &str) -> Result<&'a T> {
    table.ok_or_else(|| ChartError::MissingInput(name.to_string()))
}

fn record_unmatched(kind: ChartKind, map: &WorldMap) {
    if !map.unmatched.is_empty() {
        debug!(chart = kind.as_str(), unmatched = ?map.unmatched, "Values without a country");
        metrics::aggregate::unmatched(kind.as_str(), map.unmatched.len());
    }
}

/// Build the JSON document for one chart kind
pub fn build_chart(
    kind: ChartKind,
    raw: &RawRegistry,
    records: &[NormalizedDatasetRecord],
    inputs: &ChartInputs,
) -> Result<Value> {
    let document = match kind {
        ChartKind::Normalized => serde_json::to_value(records)?,
        ChartKind::TasksSunburst => {
            let groups = require(inputs.task_groups.as_ref(), "task groups")?;
            serde_json::to_value(group_by_category_into_hierarchy(records, groups, RecordField::Tasks))?
        }
        ChartKind::CreatorSunburst => {
            let groups = require(inputs.creator_groups.as_ref(), "creator groups")?;
            serde_json::to_value(group_by_category_into_hierarchy(records, groups, RecordField::Creators))?
        }
        ChartKind::LicenseTopics => serde_json::to_value(count_by_parent_child(
            records,
            RecordField::LicenseUseCategory,
            RecordField::TextTopics,
        ))?,
        ChartKind::LanguageMap => {
            let geography = require(inputs.geography.as_ref(), "language geography")?;
            let map = language_map(records, geography, inputs.world_atlas.as_ref());
            record_unmatched(kind, &map);
            serde_json::to_value(map)?
        }
        ChartKind::CreatorMap => {
            let countries = require(inputs.creator_countries.as_ref(), "creator countries")?;
            let map = creator_map(records, countries, inputs.world_atlas.as_ref());
            record_unmatched(kind, &map);
            serde_json::to_value(map)?
        }
        ChartKind::SourceTree => {
            let groups = require(inputs.domain_groups.as_ref(), "domain groups")?;
            let tree = source_tree(records, groups);
            if !tree.unmatched.is_empty() {
                metrics::aggregate::unmatched(kind.as_str(), tree.unmatched.len());
            }
            let mut document = serde_json::to_value(&tree)?;
            if let Value::Object(map) = &mut document {
                map.insert("paths".to_string(), json!(tree.paths()));
            }
            document
        }
        ChartKind::TextMetricsLicenses => {
            serde_json::to_value(text_metric_scatter(records, RecordField::LicenseUseCategory))?
        }
        ChartKind::TextMetricsSynthetic => {
            serde_json::to_value(text_metric_scatter(records, RecordField::SyntheticClass))?
        }
        ChartKind::SummaryMetrics => serde_json::to_value(compute_summary_metrics(raw))?,
        ChartKind::CollectionTable => {
            let summary = compute_summary_metrics(raw);
            serde_json::to_value(collection_table(raw, &summary))?
        }
    };
    Ok(document)
}

/// Use case for building charts and handing them to the output port
pub struct ChartUseCase {
    normalize: NormalizeUseCase,
    output: Box<dyn ChartOutputPort>,
}

impl ChartUseCase {
    pub fn new(normalize: NormalizeUseCase, output: Box<dyn ChartOutputPort>) -> Self {
        Self { normalize, output }
    }

    pub async fn render(&self, kind: ChartKind, raw: &RawRegistry, inputs: &ChartInputs) -> Result<Value> {
        let records = self.normalize.normalize(raw);
        let document = build_chart(kind, raw, &records, inputs)?;
        self.write(kind.as_str(), &document).await?;
        Ok(document)
    }

    /// Build and write every chart whose inputs are available
    pub async fn export(&self, raw: &RawRegistry, inputs: &ChartInputs) -> Result<ExportSummary> {
        let records = self.normalize.normalize(raw);
        let mut summary = ExportSummary::default();

        for kind in ChartKind::all() {
            match build_chart(kind, raw, &records, inputs) {
                Ok(document) => {
                    self.write(kind.as_str(), &document).await?;
                    summary.written.push(kind);
                }
                Err(ChartError::MissingInput(input)) => {
                    warn!(chart = kind.as_str(), missing = %input, "Skipping chart");
                    metrics::export::chart_skipped(kind.as_str());
                    summary.skipped.push((kind, input));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            written = summary.written.len(),
            skipped = summary.skipped.len(),
            "Export finished"
        );
        Ok(summary)
    }

    /// Sunburst of `field` values bucketed by an ad-hoc group table
    pub async fn sunburst(&self, raw: &RawRegistry, groups: &GroupTable, field: RecordField) -> Result<Value> {
        let records = self.normalize.normalize(raw);
        let document = serde_json::to_value(group_by_category_into_hierarchy(&records, groups, field))?;
        self.write(&format!("{}-sunburst", field), &document).await?;
        Ok(document)
    }

    pub async fn nested(&self, raw: &RawRegistry, parent: RecordField, child: RecordField) -> Result<Value> {
        let records = self.normalize.normalize(raw);
        let document = serde_json::to_value(count_by_parent_child(&records, parent, child))?;
        self.write(&format!("{}-{}", parent, child), &document).await?;
        Ok(document)
    }

    /// License resolution under every aggregator, per registry entry
    pub async fn licenses(&self, raw: &RawRegistry, inputs: &ChartInputs) -> Result<Value> {
        let classifier = require(inputs.license_classifier.as_ref(), "license classes")?;

        let mut entries = serde_json::Map::new();
        for (key, entry) in raw {
            entries.insert(
                key.clone(),
                json!({
                    "datasetName": entry.dataset_name,
                    "collection": entry.collection,
                    "licenses": classifier.resolve_all(entry),
                }),
            );
        }

        let document = Value::Object(entries);
        self.write("licenses", &document).await?;
        Ok(document)
    }

    /// Summary counts and distinct descriptive values for one dataset
    pub async fn inspect(&self, raw: &RawRegistry, unique_id: &str) -> Result<Value> {
        let inspection = inspect_dataset(raw, unique_id)
            .ok_or_else(|| ChartError::UnknownDataset(unique_id.to_string()))?;
        debug!(unique_id, licenses = inspection.licenses.len(), "Inspected dataset");

        let document = serde_json::to_value(inspection)?;
        self.write("inspect", &document).await?;
        Ok(document)
    }

    async fn write(&self, kind: &str, document: &Value) -> Result<()> {
        self.output.write_chart(kind, document).await?;
        metrics::export::chart_written(kind_label(kind));
        Ok(())
    }
}

/// Static metric label for a chart name; ad-hoc charts share one label
fn kind_label(kind: &str) -> &'static str {
    match kind.parse::<ChartKind>() {
        Ok(kind) => kind.as_str(),
        Err(_) if kind == "licenses" => "licenses",
        Err(_) if kind == "inspect" => "inspect",
        Err(_) => "custom",
    }
}
