use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::app::ports::AssetSourcePort;
use crate::config::{ConstantsConfig, GeographyConfig};
use crate::error::Result;
use crate::pipeline::processing::aggregate::{LanguageGeography, WorldAtlas};
use crate::pipeline::processing::filter::FilterTables;
use crate::pipeline::processing::license::LicenseClassifier;
use crate::types::{
    CountryCode, CountryLanguageShares, GroupTable, LanguageCodes, LicenseClassTable, RawRegistry,
};

/// Reference tables the charts and filters draw on. Every table is optional;
/// charts whose tables are absent are skipped.
#[derive(Debug, Default)]
pub struct ChartInputs {
    pub task_groups: Option<GroupTable>,
    pub creator_groups: Option<GroupTable>,
    pub domain_groups: Option<GroupTable>,
    pub language_groups: Option<GroupTable>,
    pub creator_countries: Option<GroupTable>,
    pub license_classifier: Option<LicenseClassifier>,
    pub geography: Option<LanguageGeography>,
    pub world_atlas: Option<WorldAtlas>,
}

impl ChartInputs {
    pub fn filter_tables(&self) -> FilterTables<'_> {
        FilterTables {
            language_groups: self.language_groups.as_ref(),
            task_groups: self.task_groups.as_ref(),
            domain_groups: self.domain_groups.as_ref(),
        }
    }
}

/// Use case for loading the data summary and reference tables
pub struct LoadUseCase {
    source: Box<dyn AssetSourcePort>,
}

impl LoadUseCase {
    pub fn new(source: Box<dyn AssetSourcePort>) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn load_registry(&self, location: &str) -> Result<RawRegistry> {
        let registry: RawRegistry = self.load_json(location).await?;
        info!(entries = registry.len(), "Loaded data summary");
        Ok(registry)
    }

    pub async fn load_group_table(&self, location: &str) -> Result<GroupTable> {
        self.load_json(location).await
    }

    pub async fn load_inputs(
        &self,
        constants: &ConstantsConfig,
        geography: &GeographyConfig,
    ) -> Result<ChartInputs> {
        let license_classifier = match self.load_optional::<LicenseClassTable>(&constants.license_classes).await? {
            Some(classes) => {
                let custom = self
                    .load_optional::<LicenseClassTable>(&constants.custom_license_classes)
                    .await?
                    .unwrap_or_default();
                Some(LicenseClassifier::new(classes, custom))
            }
            None => None,
        };

        let inputs = ChartInputs {
            task_groups: self.load_optional(&constants.task_groups).await?,
            creator_groups: self.load_optional(&constants.creator_groups).await?,
            domain_groups: self.load_optional(&constants.domain_groups).await?,
            language_groups: self.load_optional(&constants.language_groups).await?,
            creator_countries: self.load_optional(&constants.creator_countries).await?,
            license_classifier,
            geography: self.load_geography(geography).await?,
            world_atlas: match &geography.world_atlas {
                Some(location) => Some(WorldAtlas::from_topojson(&self.source.load(location).await?)?),
                None => None,
            },
        };

        info!(
            task_groups = inputs.task_groups.is_some(),
            creator_groups = inputs.creator_groups.is_some(),
            domain_groups = inputs.domain_groups.is_some(),
            license_classes = inputs.license_classifier.is_some(),
            geography = inputs.geography.is_some(),
            world_atlas = inputs.world_atlas.is_some(),
            "Loaded chart inputs"
        );
        Ok(inputs)
    }

    async fn load_geography(&self, config: &GeographyConfig) -> Result<Option<LanguageGeography>> {
        match (&config.country_codes, &config.language_codes, &config.country_language_codes) {
            (Some(countries), Some(languages), Some(shares)) => {
                let countries: Vec<CountryCode> = self.load_json(countries).await?;
                let languages: LanguageCodes = self.load_json(languages).await?;
                let shares: CountryLanguageShares = self.load_json(shares).await?;
                Ok(Some(LanguageGeography::new(&countries, &languages, &shares)))
            }
            (None, None, None) => Ok(None),
            _ => {
                warn!("Language geography needs country_codes, language_codes and country_language_codes; skipping");
                Ok(None)
            }
        }
    }

    async fn load_optional<T: DeserializeOwned>(&self, location: &Option<String>) -> Result<Option<T>> {
        match location {
            Some(location) => Ok(Some(self.load_json(location).await?)),
            None => Ok(None),
        }
    }

    async fn load_json<T: DeserializeOwned>(&self, location: &str) -> Result<T> {
        let bytes = self.source.load(location).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
