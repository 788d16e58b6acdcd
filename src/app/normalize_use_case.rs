use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::processing::filter::{apply_filters, FilterCriteria, FilterTables};
use crate::pipeline::processing::license::LicenseClassifier;
use crate::pipeline::processing::normalize::{DefaultNormalizer, NormalizedDatasetRecord, Normalizer};
use crate::types::RawRegistry;

/// Use case for turning the raw registry into chart-ready records
pub struct NormalizeUseCase {
    normalizer: Box<dyn Normalizer + Send + Sync>,
}

impl NormalizeUseCase {
    pub fn new(normalizer: Box<dyn Normalizer + Send + Sync>) -> Self {
        Self { normalizer }
    }

    /// Create a use case with the default normalizer
    pub fn with_default_normalizer() -> Self {
        Self::new(Box::new(DefaultNormalizer::default()))
    }

    /// Fill in missing license fields, then apply the filters
    pub fn prepare(
        &self,
        mut raw: RawRegistry,
        classifier: Option<&LicenseClassifier>,
        criteria: &FilterCriteria,
        tables: FilterTables<'_>,
    ) -> Result<RawRegistry> {
        match classifier {
            Some(classifier) => {
                let annotated = classifier.annotate(&mut raw);
                info!(annotated, "Resolved DataProvenance license fields");
            }
            None if criteria.license_use.is_some() => {
                warn!("No license classes configured; filtering on the registry's own license fields");
            }
            None => {}
        }

        let before = raw.len();
        let filtered = apply_filters(&raw, criteria, tables)?;
        crate::observability::metrics::filter::entries_filtered(filtered.len(), before - filtered.len());
        Ok(filtered)
    }

    /// Normalize the registry and record what was merged or left undated
    pub fn normalize(&self, raw: &RawRegistry) -> Vec<NormalizedDatasetRecord> {
        let records = self.normalizer.normalize(raw);

        crate::observability::metrics::normalize::records_normalized(records.len());
        for _ in records.len()..raw.len() {
            crate::observability::metrics::normalize::duplicate_merged();
        }
        for _ in records.iter().filter(|r| r.date.is_none()) {
            crate::observability::metrics::normalize::date_parse_failed();
        }

        info!(
            entries = raw.len(),
            records = records.len(),
            "Normalized data summary"
        );
        records
    }
}
