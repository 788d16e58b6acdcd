use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::constants::{ALL_GROUPS, LICENSE_USE_TYPES};
use crate::error::{ChartError, Result};
use crate::types::{GroupTable, RawDatasetEntry, RawRegistry};

/// Registry selection criteria; every unset criterion keeps all entries
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub collection: Option<String>,
    /// Most restrictive license use to keep, one of `LICENSE_USE_TYPES`
    pub license_use: Option<String>,
    pub max_attribution: Option<u64>,
    pub max_share_alike: Option<u64>,
    pub languages: Vec<String>,
    pub task_categories: Vec<String>,
    pub domains: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.collection.is_none()
            && self.license_use.is_none()
            && self.max_attribution.is_none()
            && self.max_share_alike.is_none()
            && !group_selection_active(&self.languages)
            && !group_selection_active(&self.task_categories)
            && !group_selection_active(&self.domains)
            && self.start.is_none()
            && self.end.is_none()
    }
}

/// Group tables the group criteria resolve through
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterTables<'a> {
    pub language_groups: Option<&'a GroupTable>,
    pub task_groups: Option<&'a GroupTable>,
    pub domain_groups: Option<&'a GroupTable>,
}

fn group_selection_active(selection: &[String]) -> bool {
    !selection.is_empty() && !selection.iter().any(|s| s == ALL_GROUPS)
}

fn allowed_values(
    selection: &[String],
    table: Option<&GroupTable>,
    table_name: &str,
) -> Result<Option<HashSet<String>>> {
    if !group_selection_active(selection) {
        return Ok(None);
    }
    let table = table.ok_or_else(|| ChartError::MissingInput(table_name.to_string()))?;
    Ok(Some(
        selection
            .iter()
            .filter_map(|group| table.get(group))
            .flatten()
            .cloned()
            .collect(),
    ))
}

fn warn_missing_values<'a>(
    registry: &'a RawRegistry,
    table: Option<&GroupTable>,
    label: &str,
    values: impl Fn(&'a RawDatasetEntry) -> &'a [String],
) {
    let Some(table) = table else {
        return;
    };
    let known: HashSet<&String> = table.values().flatten().collect();
    let missing: BTreeSet<&String> = registry
        .values()
        .flat_map(|entry| values(entry))
        .filter(|value| !known.contains(value))
        .collect();
    if !missing.is_empty() {
        warn!(kind = label, missing = ?missing, "Values missing from group table");
    }
}

/// Estimated creation date: the earliest valid `YYYY-MM-DD` among the S2,
/// Hugging Face and GitHub dates
pub fn estimated_creation_date(entry: &RawDatasetEntry) -> Option<NaiveDate> {
    let metadata = entry.metadata()?;
    [&metadata.s2_date, &metadata.hf_date, &metadata.github_date]
        .into_iter()
        .flatten()
        .filter_map(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok())
        .min()
}

pub fn apply_filters(
    registry: &RawRegistry,
    criteria: &FilterCriteria,
    tables: FilterTables<'_>,
) -> Result<RawRegistry> {
    warn_missing_values(registry, tables.language_groups, "languages", |e| e.languages.as_slice());
    warn_missing_values(registry, tables.task_groups, "task categories", |e| {
        e.task_categories.as_slice()
    });
    warn_missing_values(registry, tables.domain_groups, "text sources", |e| e.text_sources.as_slice());

    if criteria.is_empty() {
        return Ok(registry.clone());
    }

    let valid_license_uses: Option<Vec<String>> = match &criteria.license_use {
        Some(selected) => {
            let index = LICENSE_USE_TYPES
                .iter()
                .position(|t| *t == selected.as_str())
                .ok_or_else(|| {
                    ChartError::Config(format!(
                        "Unknown license use '{}', expected one of {:?}",
                        selected, LICENSE_USE_TYPES
                    ))
                })?;
            Some(LICENSE_USE_TYPES[..=index].iter().map(|t| t.to_lowercase()).collect())
        }
        None => None,
    };

    let languages = allowed_values(&criteria.languages, tables.language_groups, "language groups")?;
    let tasks = allowed_values(&criteria.task_categories, tables.task_groups, "task groups")?;
    let sources = allowed_values(&criteria.domains, tables.domain_groups, "domain groups")?;

    let within = |allowed: &Option<HashSet<String>>, values: &[String]| match allowed {
        Some(allowed) => values.iter().all(|v| allowed.contains(v)),
        None => true,
    };
    let at_most = |bound: Option<u64>, value: Option<u64>| match bound {
        Some(bound) => value.map_or(false, |v| v <= bound),
        None => true,
    };

    let filtered: RawRegistry = registry
        .iter()
        .filter(|(_, entry)| {
            criteria
                .collection
                .as_ref()
                .map_or(true, |c| &entry.collection == c)
        })
        .filter(|(_, entry)| match &valid_license_uses {
            Some(valid) => entry
                .license_use
                .as_ref()
                .map_or(false, |u| valid.contains(&u.to_lowercase())),
            None => true,
        })
        .filter(|(_, entry)| at_most(criteria.max_attribution, entry.license_attribution))
        .filter(|(_, entry)| at_most(criteria.max_share_alike, entry.license_share_alike))
        .filter(|(_, entry)| within(&languages, entry.languages.as_slice()))
        .filter(|(_, entry)| within(&tasks, entry.task_categories.as_slice()))
        .filter(|(_, entry)| within(&sources, entry.text_sources.as_slice()))
        .filter(|(_, entry)| {
            if criteria.start.is_none() && criteria.end.is_none() {
                return true;
            }
            match estimated_creation_date(entry) {
                Some(date) => {
                    criteria.start.map_or(true, |start| date >= start)
                        && criteria.end.map_or(true, |end| date <= end)
                }
                None => false,
            }
        })
        .map(|(key, entry)| (key.clone(), entry.clone()))
        .collect();

    info!(
        kept = filtered.len(),
        dropped = registry.len() - filtered.len(),
        "Applied registry filters"
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> RawRegistry {
        serde_json::from_value(json!({
            "a": {
                "Dataset Name": "a",
                "Collection": "Flan",
                "Languages": ["English"],
                "Task Categories": ["Summarization"],
                "Text Sources": ["news"],
                "License Use (DataProvenance)": "commercial",
                "License Attribution (DataProvenance)": 1,
                "License Share Alike (DataProvenance)": 0,
                "Inferred Metadata": {"S2 Date": "2021-06-01", "HF Date": "2020-01-15"}
            },
            "b": {
                "Dataset Name": "b",
                "Collection": "P3",
                "Languages": ["English", "French"],
                "Task Categories": ["Summarization"],
                "Text Sources": ["wiki"],
                "License Use (DataProvenance)": "non-commercial",
                "License Attribution (DataProvenance)": 1,
                "License Share Alike (DataProvenance)": 1,
                "Inferred Metadata": {"GitHub Date": "2022-03-10"}
            },
            "c": {
                "Dataset Name": "c",
                "Collection": "Flan",
                "Languages": ["Swahili"],
                "License Use (DataProvenance)": "unspecified",
                "License Attribution (DataProvenance)": 0,
                "License Share Alike (DataProvenance)": 0
            }
        }))
        .unwrap()
    }

    fn language_groups() -> GroupTable {
        serde_json::from_value(json!({
            "English": ["English"],
            "European": ["French", "German"],
            "African": ["Swahili"]
        }))
        .unwrap()
    }

    fn keys(registry: &RawRegistry) -> Vec<&str> {
        registry.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let raw = registry();
        let filtered = apply_filters(&raw, &FilterCriteria::default(), FilterTables::default()).unwrap();
        assert_eq!(keys(&filtered), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_all_group_disables_criterion() {
        let criteria = FilterCriteria {
            languages: vec!["All".to_string()],
            ..Default::default()
        };
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_collection_and_license_use() {
        let raw = registry();
        let criteria = FilterCriteria {
            collection: Some("Flan".to_string()),
            license_use: Some("Unspecified".to_string()),
            ..Default::default()
        };

        let filtered = apply_filters(&raw, &criteria, FilterTables::default()).unwrap();
        assert_eq!(keys(&filtered), vec!["a", "c"]);
    }

    #[test]
    fn test_unknown_license_use_is_config_error() {
        let criteria = FilterCriteria {
            license_use: Some("Anything Goes".to_string()),
            ..Default::default()
        };
        let err = apply_filters(&registry(), &criteria, FilterTables::default()).unwrap_err();
        assert!(matches!(err, ChartError::Config(_)));
    }

    #[test]
    fn test_attribution_and_share_alike_bounds() {
        let criteria = FilterCriteria {
            max_share_alike: Some(0),
            max_attribution: Some(0),
            ..Default::default()
        };
        let filtered = apply_filters(&registry(), &criteria, FilterTables::default()).unwrap();
        assert_eq!(keys(&filtered), vec!["c"]);
    }

    #[test]
    fn test_language_groups_require_all_values() {
        let groups = language_groups();
        let tables = FilterTables {
            language_groups: Some(&groups),
            ..Default::default()
        };

        let english_only = FilterCriteria {
            languages: vec!["English".to_string()],
            ..Default::default()
        };
        assert_eq!(keys(&apply_filters(&registry(), &english_only, tables).unwrap()), vec!["a"]);

        let english_european = FilterCriteria {
            languages: vec!["English".to_string(), "European".to_string()],
            ..Default::default()
        };
        assert_eq!(
            keys(&apply_filters(&registry(), &english_european, tables).unwrap()),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_group_criterion_without_table_is_missing_input() {
        let criteria = FilterCriteria {
            domains: vec!["Web".to_string()],
            ..Default::default()
        };
        let err = apply_filters(&registry(), &criteria, FilterTables::default()).unwrap_err();
        assert!(matches!(err, ChartError::MissingInput(name) if name == "domain groups"));
    }

    #[test]
    fn test_date_range_uses_earliest_date() {
        let raw = registry();
        assert_eq!(
            estimated_creation_date(&raw["a"]),
            NaiveDate::from_ymd_opt(2020, 1, 15)
        );

        let criteria = FilterCriteria {
            start: NaiveDate::from_ymd_opt(2020, 6, 1),
            ..Default::default()
        };
        let filtered = apply_filters(&raw, &criteria, FilterTables::default()).unwrap();
        // "a" predates the bound; "c" has no date at all
        assert_eq!(keys(&filtered), vec!["b"]);
    }
}
