/// Constants shared by the normalizer, the chart builders and the CLI
use once_cell::sync::Lazy;
use std::collections::HashMap;

// Chart kinds (used in CLI and as export file stems)
pub const NORMALIZED_CHART: &str = "normalized";
pub const TASKS_SUNBURST_CHART: &str = "tasks-sunburst";
pub const CREATOR_SUNBURST_CHART: &str = "creator-sunburst";
pub const LICENSE_TOPICS_CHART: &str = "license-topics";
pub const LANGUAGE_MAP_CHART: &str = "language-map";
pub const CREATOR_MAP_CHART: &str = "creator-map";
pub const SOURCE_TREE_CHART: &str = "source-tree";
pub const TEXT_METRICS_LICENSES_CHART: &str = "text-metrics-licenses";
pub const TEXT_METRICS_SYNTHETIC_CHART: &str = "text-metrics-synthetic";
pub const SUMMARY_METRICS_CHART: &str = "summary-metrics";
pub const COLLECTION_TABLE_CHART: &str = "collection-table";

/// Date used when a provenance date is absent. Not zero-padded.
pub const DEFAULT_PROVENANCE_DATE: &str = "1900-1-1";

pub const SYNTHETIC: &str = "Synthetic";
pub const REGULAR: &str = "Regular";
pub const SYNTHETIC_OTHER: &str = "Synthetic (Other)";

/// Generators that get their own synthetic class
pub const KNOWN_GENERATORS: [&str; 4] = [
    "OpenAI GPT-3",
    "OpenAI ChatGPT",
    "OpenAI GPT-4",
    "OpenAI Codex",
];

/// Raw license-use label to coarse license-use category
pub static LICENSE_USE_REMAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("commercial", "Commercial"),
        ("unspecified", "Unspecified"),
        ("non-commercial", "Non-Commercial/Academic"),
        ("academic-only", "Non-Commercial/Academic"),
        ("unclear", "Non-Commercial/Academic"),
    ])
});

/// License-use levels from most to least permissive
pub const LICENSE_USE_TYPES: [&str; 5] = [
    "Commercial",
    "Unspecified",
    "Non-Commercial",
    "Unclear",
    "Academic-Only",
];

/// Domains dropped from the source tree before model generators are added
pub const SOURCE_TREE_EXCLUDED_DOMAINS: [&str; 3] = ["Unsure", "Others", "Models"];
pub const MODELS_DOMAIN: &str = "Models";
pub const SOURCE_TREE_TOP_N: usize = 5;
pub const SOURCE_TREE_OTHER: &str = "Other";
pub const SOURCE_TREE_DELIMITER: &str = "]";

/// Minimum spoken share for a language to appear in a country tooltip
pub const SPOKEN_LANGUAGE_TOOLTIP_THRESHOLD: f64 = 0.05;

pub const LANGUAGE_MAP_TITLE: &str = "Language Distribution";
pub const CREATOR_MAP_TITLE: &str = "Creator Distribution";

/// Parent bucket for records with no value in the parent field
pub const MISSING_PARENT: &str = "undefined";

/// Group-table selection that disables a filter criterion
pub const ALL_GROUPS: &str = "All";

/// Get all chart kinds in export order
pub fn get_chart_kinds() -> Vec<&'static str> {
    vec![
        NORMALIZED_CHART,
        TASKS_SUNBURST_CHART,
        CREATOR_SUNBURST_CHART,
        LICENSE_TOPICS_CHART,
        LANGUAGE_MAP_CHART,
        CREATOR_MAP_CHART,
        SOURCE_TREE_CHART,
        TEXT_METRICS_LICENSES_CHART,
        TEXT_METRICS_SYNTHETIC_CHART,
        SUMMARY_METRICS_CHART,
        COLLECTION_TABLE_CHART,
    ]
}
