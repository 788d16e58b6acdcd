use std::fmt;
use std::str::FromStr;

use super::NormalizedDatasetRecord;
use crate::error::ChartError;

/// Addressable fields of a normalized record, named as they serialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    DatasetName,
    Collection,
    Languages,
    Tasks,
    TextSources,
    TextDomains,
    Creators,
    LicenseUseClass,
    LicenseUseCategory,
    Synthetic,
    SyntheticClass,
    ModelGenerated,
    TextTopics,
    CitationCount,
    DownloadCount,
    InputTextLen,
    TargetTextLen,
    Date,
    HfLink,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::DatasetName => "datasetName",
            RecordField::Collection => "collection",
            RecordField::Languages => "languages",
            RecordField::Tasks => "tasks",
            RecordField::TextSources => "textSources",
            RecordField::TextDomains => "textDomains",
            RecordField::Creators => "creators",
            RecordField::LicenseUseClass => "licenseUseClass",
            RecordField::LicenseUseCategory => "licenseUseCategory",
            RecordField::Synthetic => "synthetic",
            RecordField::SyntheticClass => "syntheticClass",
            RecordField::ModelGenerated => "modelGenerated",
            RecordField::TextTopics => "textTopics",
            RecordField::CitationCount => "citationCount",
            RecordField::DownloadCount => "downloadCount",
            RecordField::InputTextLen => "inputTextLen",
            RecordField::TargetTextLen => "targetTextLen",
            RecordField::Date => "date",
            RecordField::HfLink => "hfLink",
        }
    }

    pub fn all() -> impl Iterator<Item = RecordField> {
        use RecordField::*;
        [
            DatasetName,
            Collection,
            Languages,
            Tasks,
            TextSources,
            TextDomains,
            Creators,
            LicenseUseClass,
            LicenseUseCategory,
            Synthetic,
            SyntheticClass,
            ModelGenerated,
            TextTopics,
            CitationCount,
            DownloadCount,
            InputTextLen,
            TargetTextLen,
            Date,
            HfLink,
        ]
        .into_iter()
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            RecordField::Languages
                | RecordField::Tasks
                | RecordField::TextSources
                | RecordField::TextDomains
                | RecordField::Creators
                | RecordField::ModelGenerated
                | RecordField::TextTopics
        )
    }

    fn list<'a>(&self, record: &'a NormalizedDatasetRecord) -> Option<&'a [String]> {
        match self {
            RecordField::Languages => Some(record.languages.as_slice()),
            RecordField::Tasks => Some(record.tasks.as_slice()),
            RecordField::TextSources => Some(record.text_sources.as_slice()),
            RecordField::TextDomains => Some(record.text_domains.as_slice()),
            RecordField::Creators => Some(record.creators.as_slice()),
            RecordField::ModelGenerated => Some(record.model_generated.as_slice()),
            RecordField::TextTopics => Some(record.text_topics.as_slice()),
            _ => None,
        }
    }

    /// Single value of the field; list fields are joined with `,`
    pub fn scalar(&self, record: &NormalizedDatasetRecord) -> Option<String> {
        if let Some(items) = self.list(record) {
            return Some(items.join(","));
        }
        match self {
            RecordField::DatasetName => Some(record.dataset_name.clone()),
            RecordField::Collection => Some(record.collection.clone()),
            RecordField::LicenseUseClass => record.license_use_class.clone(),
            RecordField::LicenseUseCategory => record.license_use_category.clone(),
            RecordField::Synthetic => Some(record.synthetic.clone()),
            RecordField::SyntheticClass => Some(record.synthetic_class.clone()),
            RecordField::CitationCount => Some(record.citation_count.to_string()),
            RecordField::DownloadCount => Some(record.download_count.to_string()),
            RecordField::InputTextLen => Some(record.input_text_len.to_string()),
            RecordField::TargetTextLen => Some(record.target_text_len.to_string()),
            RecordField::Date => record.date.map(|d| d.format("%Y-%m-%d").to_string()),
            RecordField::HfLink => record.hf_link.clone(),
            _ => None,
        }
    }

    /// Every value of the field; scalar fields yield at most one
    pub fn values(&self, record: &NormalizedDatasetRecord) -> Vec<String> {
        match self.list(record) {
            Some(items) => items.to_vec(),
            None => self.scalar(record).into_iter().collect(),
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordField::all()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| ChartError::UnknownField(s.to_string()))
    }
}
