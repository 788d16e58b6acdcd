use chrono::NaiveDate;
use indexmap::map::Entry;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_PROVENANCE_DATE, KNOWN_GENERATORS, LICENSE_USE_REMAP, REGULAR, SYNTHETIC,
    SYNTHETIC_OTHER,
};
use crate::types::{RawDatasetEntry, RawRegistry};

pub mod fields;

pub use fields::RecordField;

static PROVENANCE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{1,2}))?(?:-(\d{1,2}))?(?:T.*)?$").expect("valid date regex")
});

static PADDED_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date regex"));

/// One chart-ready record per distinct dataset name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDatasetRecord {
    pub dataset_name: String,
    pub collection: String,
    /// Union of languages across every entry sharing this name
    pub languages: Vec<String>,
    pub tasks: Vec<String>,
    pub text_sources: Vec<String>,
    pub text_domains: Vec<String>,
    pub creators: Vec<String>,
    pub license_use_class: Option<String>,
    pub license_use_category: Option<String>,
    pub synthetic: String,
    pub synthetic_class: String,
    pub model_generated: Vec<String>,
    pub text_topics: Vec<String>,
    pub citation_count: u64,
    pub download_count: u64,
    pub input_text_len: f64,
    pub target_text_len: f64,
    pub pwc_date: String,
    pub ss_date: String,
    pub date: Option<NaiveDate>,
    pub hf_link: Option<String>,
}

/// Turns a raw registry into de-duplicated records
pub trait Normalizer {
    fn normalize(&self, raw: &RawRegistry) -> Vec<NormalizedDatasetRecord>;
}

/// Normalizer with the first-seen-wins merge rule
pub struct DefaultNormalizer {
    pub known_generators: Vec<String>,
}

impl Default for DefaultNormalizer {
    fn default() -> Self {
        Self {
            known_generators: KNOWN_GENERATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DefaultNormalizer {
    pub fn new(known_generators: Vec<String>) -> Self {
        Self { known_generators }
    }

    fn build_record(&self, entry: &RawDatasetEntry, languages: Vec<String>) -> NormalizedDatasetRecord {
        let metadata = entry.metadata();
        let text_metrics = entry.text_metrics.as_ref();

        let pwc_date = metadata
            .and_then(|m| m.pwc_date.clone())
            .unwrap_or_else(|| DEFAULT_PROVENANCE_DATE.to_string());
        let ss_date = metadata
            .and_then(|m| m.s2_date.clone())
            .unwrap_or_else(|| DEFAULT_PROVENANCE_DATE.to_string());

        // String comparison, not chronological
        let chosen = if pwc_date < ss_date { &pwc_date } else { &ss_date };
        let date = parse_provenance_date(chosen);
        if date.is_none() {
            warn!(
                dataset = %entry.dataset_name,
                date = %chosen,
                "Unparseable provenance date"
            );
        }

        let (synthetic, synthetic_class) = self.classify_synthetic(&entry.model_generated);

        NormalizedDatasetRecord {
            dataset_name: entry.dataset_name.clone(),
            collection: entry.collection.clone(),
            languages,
            tasks: entry.task_categories.clone(),
            text_sources: entry.text_sources.clone(),
            text_domains: entry.text_domains.clone(),
            creators: entry.creators.clone(),
            license_use_class: entry.license_use.clone(),
            license_use_category: entry.license_use.as_deref().map(remap_license_use),
            synthetic,
            synthetic_class,
            model_generated: entry.model_generated.clone(),
            text_topics: metadata.map(|m| m.text_topics.clone()).unwrap_or_default(),
            citation_count: metadata.and_then(|m| m.citation_count).unwrap_or(0),
            download_count: metadata.and_then(|m| m.download_count).unwrap_or(0),
            input_text_len: round_one_decimal(text_metrics.and_then(|t| t.mean_inputs_length)),
            target_text_len: round_one_decimal(text_metrics.and_then(|t| t.mean_targets_length)),
            pwc_date,
            ss_date,
            date,
            hf_link: entry.hf_link.clone(),
        }
    }

    fn classify_synthetic(&self, models: &[String]) -> (String, String) {
        match models.first() {
            None => (REGULAR.to_string(), REGULAR.to_string()),
            Some(first) if self.known_generators.iter().any(|g| g == first) => {
                (SYNTHETIC.to_string(), format!("{} ({})", SYNTHETIC, first))
            }
            Some(_) => (SYNTHETIC.to_string(), SYNTHETIC_OTHER.to_string()),
        }
    }
}

impl Normalizer for DefaultNormalizer {
    fn normalize(&self, raw: &RawRegistry) -> Vec<NormalizedDatasetRecord> {
        let mut languages = accumulate_languages(raw);
        let mut records: IndexMap<&str, NormalizedDatasetRecord> = IndexMap::new();

        for entry in raw.values() {
            match records.entry(entry.dataset_name.as_str()) {
                Entry::Occupied(_) => {
                    debug!(dataset = %entry.dataset_name, "Merged duplicate dataset entry");
                }
                Entry::Vacant(slot) => {
                    let merged = languages
                        .swap_remove(entry.dataset_name.as_str())
                        .unwrap_or_default();
                    slot.insert(self.build_record(entry, merged));
                }
            }
        }

        records.into_values().collect()
    }
}

/// Languages per dataset name, deduplicated in first-seen order
fn accumulate_languages(raw: &RawRegistry) -> IndexMap<&str, Vec<String>> {
    let mut accumulated: IndexMap<&str, Vec<String>> = IndexMap::new();
    for entry in raw.values() {
        let languages = accumulated.entry(entry.dataset_name.as_str()).or_default();
        for language in &entry.languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
    }
    accumulated
}

pub fn remap_license_use(label: &str) -> String {
    LICENSE_USE_REMAP
        .get(label)
        .map(|mapped| mapped.to_string())
        .unwrap_or_else(|| label.to_string())
}

/// `round(x * 10) / 10` with half-up rounding; absent values become 0
pub fn round_one_decimal(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => (v * 10.0 + 0.5).floor() / 10.0,
        _ => 0.0,
    }
}

/// Parse `YYYY`, `YYYY-M` or `YYYY-M-D`, padded or not, with an optional time suffix
pub fn parse_provenance_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if !PADDED_ISO_DATE.is_match(trimmed) {
        debug!(date = %trimmed, "Provenance date is not zero-padded ISO; string ordering may differ from calendar ordering");
    }
    let caps = PROVENANCE_DATE.captures(trimmed)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2).map_or(Some(1), |m| m.as_str().parse().ok())?;
    let day: u32 = caps.get(3).map_or(Some(1), |d| d.as_str().parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}
