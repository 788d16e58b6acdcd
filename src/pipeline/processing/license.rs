//! License classification across the license aggregators
//!
//! Each license name (or custom license URL) maps to a use class, an
//! attribution level and a share-alike level. A dataset's licenses are
//! resolved to the most restrictive combination.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{LicenseClassTable, RawDatasetEntry, RawRegistry};

const CUSTOM_LICENSE: &str = "Custom";
const OPENAI_LICENSE: &str = "OpenAI";
const UNSPECIFIED_LICENSE: &str = "Unspecified";
const UNKNOWN: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregator {
    DataProvenance,
    DataProvenanceIgnoreOpenAi,
    HuggingFace,
    GitHub,
    PapersWithCode,
}

impl Aggregator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::DataProvenance => "DataProvenance",
            Aggregator::DataProvenanceIgnoreOpenAi => "DataProvenance IgnoreOpenAI",
            Aggregator::HuggingFace => "HuggingFace",
            Aggregator::GitHub => "GitHub",
            Aggregator::PapersWithCode => "PapersWithCode",
        }
    }

    pub fn all() -> impl Iterator<Item = Aggregator> {
        [
            Aggregator::DataProvenance,
            Aggregator::DataProvenanceIgnoreOpenAi,
            Aggregator::HuggingFace,
            Aggregator::GitHub,
            Aggregator::PapersWithCode,
        ]
        .into_iter()
    }
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single license
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseCriteria {
    pub use_class: String,
    pub attribution: u64,
    pub share_alike: u64,
}

/// Most restrictive combination over a dataset's licenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLicense {
    pub license_use: String,
    pub attribution: u64,
    pub share_alike: u64,
}

pub fn resolve(criteria: &[LicenseCriteria]) -> Option<ResolvedLicense> {
    if criteria.is_empty() {
        return None;
    }
    let any = |class: &str| criteria.iter().any(|c| c.use_class == class);

    let license_use = if any(UNKNOWN) || any("Acad") {
        "academic-only"
    } else if any("NC") {
        "non-commercial"
    } else if any(UNSPECIFIED_LICENSE) {
        "unspecified"
    } else {
        "commercial"
    };

    Some(ResolvedLicense {
        license_use: license_use.to_string(),
        attribution: criteria.iter().map(|c| c.attribution).max().unwrap_or(1),
        share_alike: criteria.iter().map(|c| c.share_alike).max().unwrap_or(1),
    })
}

fn level(raw: &str) -> u64 {
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse().unwrap_or(1)
    } else {
        1
    }
}

#[derive(Debug)]
pub struct LicenseClassifier {
    classes: LicenseClassTable,
    custom_classes: LicenseClassTable,
}

impl LicenseClassifier {
    pub fn new(classes: LicenseClassTable, custom_classes: LicenseClassTable) -> Self {
        Self {
            classes,
            custom_classes,
        }
    }

    pub fn classify(&self, name: &str, url: Option<&str>) -> LicenseCriteria {
        let found = if name == CUSTOM_LICENSE {
            url.and_then(|u| self.custom_classes.get(u))
        } else {
            self.classes.get(name)
        };

        match found {
            Some((use_class, attribution, share_alike)) => LicenseCriteria {
                use_class: use_class.clone(),
                attribution: level(attribution),
                share_alike: level(share_alike),
            },
            None => {
                debug!(license = name, url = ?url, "License missing from class table");
                LicenseCriteria {
                    use_class: UNKNOWN.to_string(),
                    attribution: 1,
                    share_alike: 1,
                }
            }
        }
    }

    /// (license name, license URL) pairs an aggregator reports for an entry
    pub fn license_infos(entry: &RawDatasetEntry, aggregator: Aggregator) -> Vec<(String, Option<String>)> {
        let metadata = entry.metadata();
        let inferred = |license: Option<&String>| {
            license
                .filter(|l| !l.is_empty())
                .map(|l| (l.clone(), None::<String>))
        };

        match aggregator {
            Aggregator::DataProvenance => entry
                .licenses
                .iter()
                .filter_map(|l| l.license.clone().map(|name| (name, l.license_url.clone())))
                .collect(),
            Aggregator::DataProvenanceIgnoreOpenAi => {
                let infos: Vec<_> = Self::license_infos(entry, Aggregator::DataProvenance)
                    .into_iter()
                    .filter(|(name, _)| name != OPENAI_LICENSE)
                    .collect();
                if infos.is_empty() {
                    vec![(UNSPECIFIED_LICENSE.to_string(), None)]
                } else {
                    infos
                }
            }
            Aggregator::HuggingFace => inferred(metadata.and_then(|m| m.hf_yaml_license.as_ref()))
                .into_iter()
                .chain(inferred(metadata.and_then(|m| m.hf_config_license.as_ref())))
                .collect(),
            Aggregator::GitHub => inferred(metadata.and_then(|m| m.github_license.as_ref()))
                .into_iter()
                .collect(),
            Aggregator::PapersWithCode => inferred(metadata.and_then(|m| m.pwc_license.as_ref()))
                .into_iter()
                .collect(),
        }
    }

    pub fn resolve_entry(&self, entry: &RawDatasetEntry, aggregator: Aggregator) -> Option<ResolvedLicense> {
        let criteria: Vec<LicenseCriteria> = Self::license_infos(entry, aggregator)
            .iter()
            .map(|(name, url)| self.classify(name, url.as_deref()))
            .collect();
        resolve(&criteria)
    }

    /// Resolution under every aggregator, keyed by aggregator name
    pub fn resolve_all(&self, entry: &RawDatasetEntry) -> IndexMap<&'static str, Option<ResolvedLicense>> {
        Aggregator::all()
            .map(|aggregator| (aggregator.as_str(), self.resolve_entry(entry, aggregator)))
            .collect()
    }

    /// Recompute the DataProvenance use, attribution and share-alike fields
    /// from each entry's licenses, replacing whatever the registry carried.
    /// Entries without licenses keep their fields. Returns the number of
    /// entries resolved.
    pub fn annotate(&self, registry: &mut RawRegistry) -> usize {
        let mut changed = 0;
        for entry in registry.values_mut() {
            let Some(resolved) = self.resolve_entry(entry, Aggregator::DataProvenance) else {
                continue;
            };
            entry.license_use = Some(resolved.license_use);
            entry.license_attribution = Some(resolved.attribution);
            entry.license_share_alike = Some(resolved.share_alike);
            changed += 1;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classifier() -> LicenseClassifier {
        let classes: LicenseClassTable = serde_json::from_value(json!({
            "Apache License 2.0": ["All", "1", "0"],
            "CC BY-NC 4.0": ["NC", "1", "0"],
            "CC BY-SA 4.0": ["All", "1", "1"],
            "Academic Only": ["Acad", "0", "0"],
            "OpenAI": ["NC", "0", "0"],
            "Unspecified": ["Unspecified", "?", "?"],
            "MIT": ["All", "1", "0"]
        }))
        .unwrap();
        let custom: LicenseClassTable = serde_json::from_value(json!({
            "https://example.org/terms": ["NC", "2", "0"]
        }))
        .unwrap();
        LicenseClassifier::new(classes, custom)
    }

    fn criteria(use_class: &str) -> LicenseCriteria {
        LicenseCriteria {
            use_class: use_class.to_string(),
            attribution: 0,
            share_alike: 0,
        }
    }

    #[test]
    fn test_resolution_precedence() {
        assert_eq!(resolve(&[]), None);
        let cases: [(&[&str], &str); 6] = [
            (&["All"], "commercial"),
            (&["All", "Unspecified"], "unspecified"),
            (&["Unspecified", "NC"], "non-commercial"),
            (&["NC", "Acad"], "academic-only"),
            (&["All", "?"], "academic-only"),
            (&["Something"], "commercial"),
        ];
        for (classes, expected) in cases {
            let classified: Vec<_> = classes.iter().map(|c| criteria(c)).collect();
            assert_eq!(resolve(&classified).unwrap().license_use, expected, "{:?}", classes);
        }
    }

    #[test]
    fn test_classify_levels_and_unknowns() {
        let classifier = classifier();

        let sa = classifier.classify("CC BY-SA 4.0", None);
        assert_eq!((sa.attribution, sa.share_alike), (1, 1));

        let unspecified = classifier.classify("Unspecified", None);
        assert_eq!((unspecified.attribution, unspecified.share_alike), (1, 1));

        let custom = classifier.classify("Custom", Some("https://example.org/terms"));
        assert_eq!(custom.use_class, "NC");
        assert_eq!(custom.attribution, 2);

        let missing = classifier.classify("Never Heard Of It", None);
        assert_eq!(missing.use_class, "?");
        assert_eq!(classifier.classify("Custom", None).use_class, "?");
    }

    #[test]
    fn test_aggregators() {
        let entry: RawDatasetEntry = serde_json::from_value(json!({
            "Licenses": [
                {"License": "OpenAI", "License URL": "https://openai.com/policies/terms-of-use"},
                {"License": "Apache License 2.0"}
            ],
            "Inferred Metadata": {
                "HF Yaml License": "MIT",
                "HF Config License": "CC BY-NC 4.0",
                "GitHub License": "",
                "PwC License Name": "Apache License 2.0"
            }
        }))
        .unwrap();

        let resolved = classifier().resolve_all(&entry);

        assert_eq!(resolved["DataProvenance"].as_ref().unwrap().license_use, "non-commercial");
        assert_eq!(resolved["DataProvenance IgnoreOpenAI"].as_ref().unwrap().license_use, "commercial");
        assert_eq!(resolved["HuggingFace"].as_ref().unwrap().license_use, "non-commercial");
        assert_eq!(resolved["GitHub"], None);
        assert_eq!(resolved["PapersWithCode"].as_ref().unwrap().license_use, "commercial");
    }

    #[test]
    fn test_openai_only_falls_back_to_unspecified() {
        let entry: RawDatasetEntry = serde_json::from_value(json!({
            "Licenses": [{"License": "OpenAI"}]
        }))
        .unwrap();

        let resolved = classifier()
            .resolve_entry(&entry, Aggregator::DataProvenanceIgnoreOpenAi)
            .unwrap();
        assert_eq!(resolved.license_use, "unspecified");
    }

    #[test]
    fn test_annotate_replaces_registry_license_fields() {
        let mut registry: RawRegistry = serde_json::from_value(json!({
            "a": {"Dataset Name": "a", "Licenses": [{"License": "CC BY-SA 4.0"}]},
            "b": {
                "Dataset Name": "b",
                "Licenses": [{"License": "CC BY-NC 4.0"}],
                "License Use (DataProvenance)": "commercial",
                "License Attribution (DataProvenance)": 0,
                "License Share Alike (DataProvenance)": 0
            },
            "c": {"Dataset Name": "c"}
        }))
        .unwrap();

        let changed = classifier().annotate(&mut registry);

        assert_eq!(changed, 2);
        assert_eq!(registry["a"].license_use.as_deref(), Some("commercial"));
        assert_eq!(registry["a"].license_share_alike, Some(1));
        // stale registry values give way to the classified licenses
        assert_eq!(registry["b"].license_use.as_deref(), Some("non-commercial"));
        assert_eq!(registry["b"].license_attribution, Some(1));
        assert!(registry["c"].license_use.is_none());
    }
}
