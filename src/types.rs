use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Raw data summary as loaded from JSON, keyed by registry id in document order
pub type RawRegistry = IndexMap<String, RawDatasetEntry>;

/// Named group to its member values, in document order
pub type GroupTable = IndexMap<String, Vec<String>>;

/// One dataset entry from the data summary.
///
/// Every field is optional in the source JSON; defaults are applied here so
/// nothing downstream has to probe for missing keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDatasetEntry {
    #[serde(rename = "Unique Dataset Identifier", default)]
    pub unique_id: Option<String>,
    #[serde(rename = "Dataset Name", default, deserialize_with = "de::string_or_default")]
    pub dataset_name: String,
    #[serde(rename = "Paper Title", default, deserialize_with = "de::opt_string")]
    pub paper_title: Option<String>,
    #[serde(rename = "Dataset URL", default, deserialize_with = "de::opt_string")]
    pub dataset_url: Option<String>,
    #[serde(rename = "Collection", default, deserialize_with = "de::string_or_default")]
    pub collection: String,
    #[serde(rename = "Languages", default, deserialize_with = "de::string_list")]
    pub languages: Vec<String>,
    #[serde(rename = "Task Categories", default, deserialize_with = "de::string_list")]
    pub task_categories: Vec<String>,
    #[serde(rename = "Text Sources", default, deserialize_with = "de::string_list")]
    pub text_sources: Vec<String>,
    #[serde(rename = "Text Domains", default, deserialize_with = "de::string_list")]
    pub text_domains: Vec<String>,
    #[serde(rename = "Creators", default, deserialize_with = "de::string_list")]
    pub creators: Vec<String>,
    #[serde(rename = "Format", default, deserialize_with = "de::string_list")]
    pub format: Vec<String>,
    #[serde(rename = "Licenses", default, deserialize_with = "de::license_list")]
    pub licenses: Vec<LicenseInfo>,
    #[serde(rename = "License Use (DataProvenance)", default)]
    pub license_use: Option<String>,
    #[serde(rename = "License Attribution (DataProvenance)", default, deserialize_with = "de::opt_u64")]
    pub license_attribution: Option<u64>,
    #[serde(rename = "License Share Alike (DataProvenance)", default, deserialize_with = "de::opt_u64")]
    pub license_share_alike: Option<u64>,
    #[serde(rename = "Model Generated", default, deserialize_with = "de::string_list")]
    pub model_generated: Vec<String>,
    #[serde(rename = "Hugging Face URL", default)]
    pub hf_link: Option<String>,
    #[serde(rename = "Inferred Metadata", default)]
    pub inferred_metadata: Option<InferredMetadata>,
    #[serde(rename = "Text Metrics", default)]
    pub text_metrics: Option<TextMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseInfo {
    #[serde(rename = "License", default)]
    pub license: Option<String>,
    #[serde(rename = "License URL", default)]
    pub license_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferredMetadata {
    #[serde(rename = "Text Topics", default, deserialize_with = "de::string_list")]
    pub text_topics: Vec<String>,
    #[serde(rename = "S2 Citation Count (June 2023)", default, deserialize_with = "de::opt_u64")]
    pub citation_count: Option<u64>,
    #[serde(rename = "HF Downloads (June 2023)", default, deserialize_with = "de::opt_u64")]
    pub download_count: Option<u64>,
    #[serde(rename = "PwC Date", default)]
    pub pwc_date: Option<String>,
    #[serde(rename = "S2 Date", default)]
    pub s2_date: Option<String>,
    #[serde(rename = "HF Date", default)]
    pub hf_date: Option<String>,
    #[serde(rename = "GitHub Date", default)]
    pub github_date: Option<String>,
    #[serde(rename = "GitHub License", default)]
    pub github_license: Option<String>,
    #[serde(rename = "HF Yaml License", default)]
    pub hf_yaml_license: Option<String>,
    #[serde(rename = "HF Config License", default)]
    pub hf_config_license: Option<String>,
    #[serde(rename = "PwC License Name", default)]
    pub pwc_license: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextMetrics {
    #[serde(rename = "Mean Inputs Length", default, deserialize_with = "de::opt_f64")]
    pub mean_inputs_length: Option<f64>,
    #[serde(rename = "Mean Targets Length", default, deserialize_with = "de::opt_f64")]
    pub mean_targets_length: Option<f64>,
    #[serde(rename = "Num Dialogs", default, deserialize_with = "de::opt_f64")]
    pub num_dialogs: Option<f64>,
}

impl RawDatasetEntry {
    pub fn metadata(&self) -> Option<&InferredMetadata> {
        self.inferred_metadata.as_ref()
    }
}

/// Country entry from the country-code reference table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryCode {
    pub code: String,
    pub name: String,
}

/// Share of a country's population speaking one language
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LanguageShare {
    #[serde(deserialize_with = "de::f64_or_zero")]
    pub percent: f64,
}

/// Language code to `;`-separated language names
pub type LanguageCodes = IndexMap<String, String>;

/// Country code to language code to share
pub type CountryLanguageShares = IndexMap<String, IndexMap<String, LanguageShare>>;

/// License name (or custom license URL) to `[use, attribution, share_alike]`
pub type LicenseClassTable = IndexMap<String, (String, String, String)>;

/// Lenient deserializers for loosely typed summary fields
pub(crate) mod de {
    use super::*;
    use serde_json::Value;

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(number).filter(|v| v.is_finite()))
    }

    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match &v {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)
            }),
            other => number(other).filter(|f| *f >= 0.0).map(|f| f as u64),
        }))
    }

    pub fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_f64(deserializer)?.unwrap_or(0.0))
    }

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Strings and scalars as text; null and containers become absent
    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Value>::deserialize(deserializer)?.and_then(text))
    }

    pub fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    /// License objects; null, non-list values and malformed items are dropped
    pub fn license_list<'de, D>(deserializer: D) -> Result<Vec<LicenseInfo>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(fields) => Some(LicenseInfo {
                        license: fields.get("License").cloned().and_then(text),
                        license_url: fields.get("License URL").cloned().and_then(text),
                    }),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    /// Accepts a list of strings, a single string, or null
    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Some(Value::String(s)) => vec![s],
            _ => Vec::new(),
        })
    }
}
