use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{RawDatasetEntry, RawRegistry};

/// Value -> occurrence count, in first-seen order
pub type Counts = IndexMap<String, u64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub collections: Counts,
    pub datasets: Counts,
    pub languages: Counts,
    pub task_categories: Counts,
    pub licenses: Counts,
    pub formats: Counts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRow {
    pub collection: String,
    pub datasets: usize,
    pub dialogs: f64,
    pub languages: usize,
    pub tasks: usize,
    pub topics: usize,
    pub sources: usize,
    pub generated_by: String,
    pub mean_input_words: Option<f64>,
    pub mean_target_words: Option<f64>,
}

/// One dataset's summary counts and the distinct non-empty values of its
/// descriptive fields, across every entry sharing its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInspection {
    pub unique_id: String,
    pub metrics: SummaryMetrics,
    pub paper_titles: BTreeSet<String>,
    pub dataset_urls: BTreeSet<String>,
    pub hugging_face_urls: BTreeSet<String>,
    pub formats: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub task_categories: BTreeSet<String>,
    pub creators: BTreeSet<String>,
    pub text_sources: BTreeSet<String>,
    pub licenses: BTreeSet<String>,
}

fn bump<'a>(counts: &mut Counts, values: impl IntoIterator<Item = &'a String>) {
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
}

fn dataset_id<'a>(key: &'a str, entry: &'a RawDatasetEntry) -> &'a str {
    entry.unique_id.as_deref().unwrap_or(key)
}

/// Collection, dataset and language counts over every entry; task, format
/// and license counts over the first entry per dataset name only
pub fn compute_summary_metrics(raw: &RawRegistry) -> SummaryMetrics {
    let mut metrics = SummaryMetrics::default();
    let mut seen_names: HashSet<&str> = HashSet::new();

    for (key, entry) in raw {
        *metrics.collections.entry(entry.collection.clone()).or_insert(0) += 1;
        *metrics.datasets.entry(dataset_id(key, entry).to_string()).or_insert(0) += 1;
        bump(&mut metrics.languages, &entry.languages);

        if !seen_names.insert(entry.dataset_name.as_str()) {
            continue;
        }
        bump(&mut metrics.task_categories, &entry.task_categories);
        bump(&mut metrics.formats, &entry.format);
        bump(
            &mut metrics.licenses,
            entry
                .licenses
                .iter()
                .filter_map(|l| l.license.as_ref())
                .filter(|l| !l.is_empty()),
        );
    }

    metrics
}

pub fn collection_table(raw: &RawRegistry, metrics: &SummaryMetrics) -> Vec<CollectionRow> {
    metrics
        .collections
        .keys()
        .map(|collection| collection_row(raw, collection))
        .collect()
}

fn collection_row(raw: &RawRegistry, collection: &str) -> CollectionRow {
    let subset: Vec<(&String, &RawDatasetEntry)> =
        raw.iter().filter(|(_, e)| e.collection == collection).collect();

    let datasets: HashSet<&str> = subset.iter().map(|(k, e)| dataset_id(k, e)).collect();
    let languages: HashSet<&String> = subset.iter().flat_map(|(_, e)| &e.languages).collect();
    let tasks: HashSet<&String> = subset.iter().flat_map(|(_, e)| &e.task_categories).collect();
    let sources: HashSet<&String> = subset.iter().flat_map(|(_, e)| &e.text_sources).collect();
    let topics: HashSet<&String> = subset
        .iter()
        .filter_map(|(_, e)| e.metadata())
        .flat_map(|m| &m.text_topics)
        .collect();

    let mut models = Counts::new();
    bump(&mut models, subset.iter().flat_map(|(_, e)| &e.model_generated));
    let mut generated_by = String::new();
    let mut best = 0;
    for (model, count) in &models {
        if *count > best {
            best = *count;
            generated_by = model.clone();
        }
    }

    let dialogs: f64 = subset
        .iter()
        .filter_map(|(_, e)| e.text_metrics.as_ref().and_then(|t| t.num_dialogs))
        .sum();

    CollectionRow {
        collection: collection.to_string(),
        datasets: datasets.len(),
        dialogs,
        languages: languages.len(),
        tasks: tasks.len(),
        topics: topics.len(),
        sources: sources.len(),
        generated_by,
        mean_input_words: mean(
            subset
                .iter()
                .filter_map(|(_, e)| e.text_metrics.as_ref().and_then(|t| t.mean_inputs_length)),
        ),
        mean_target_words: mean(
            subset
                .iter()
                .filter_map(|(_, e)| e.text_metrics.as_ref().and_then(|t| t.mean_targets_length)),
        ),
    }
}

pub fn inspect_dataset(raw: &RawRegistry, unique_id: &str) -> Option<DatasetInspection> {
    let selected: RawRegistry = raw
        .iter()
        .filter(|(key, entry)| dataset_id(key, entry) == unique_id)
        .map(|(key, entry)| (key.clone(), entry.clone()))
        .collect();
    if selected.is_empty() {
        return None;
    }

    let entries = || selected.values();
    Some(DatasetInspection {
        unique_id: unique_id.to_string(),
        metrics: compute_summary_metrics(&selected),
        paper_titles: distinct(entries().filter_map(|e| e.paper_title.as_ref())),
        dataset_urls: distinct(entries().filter_map(|e| e.dataset_url.as_ref())),
        hugging_face_urls: distinct(entries().filter_map(|e| e.hf_link.as_ref())),
        formats: distinct(entries().flat_map(|e| &e.format)),
        languages: distinct(entries().flat_map(|e| &e.languages)),
        task_categories: distinct(entries().flat_map(|e| &e.task_categories)),
        creators: distinct(entries().flat_map(|e| &e.creators)),
        text_sources: distinct(entries().flat_map(|e| &e.text_sources)),
        licenses: distinct(
            entries()
                .flat_map(|e| &e.licenses)
                .filter_map(|l| l.license.as_ref()),
        ),
    })
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> BTreeSet<String> {
    values.filter(|v| !v.trim().is_empty()).cloned().collect()
}

/// Arithmetic mean rounded to one decimal, `None` for no values
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| (sum / n as f64 * 10.0).round() / 10.0)
}
