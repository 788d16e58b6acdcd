use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{CREATOR_MAP_TITLE, LANGUAGE_MAP_TITLE, SPOKEN_LANGUAGE_TOOLTIP_THRESHOLD};
use crate::error::Result;
use crate::pipeline::processing::normalize::NormalizedDatasetRecord;
use crate::types::{CountryCode, CountryLanguageShares, GroupTable, LanguageCodes};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryValue {
    pub name: String,
    pub value: f64,
}

/// Per-country values normalized to the busiest country, ready for a
/// choropleth keyed by atlas country name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMap {
    pub title: String,
    pub values: Vec<CountryValue>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tooltips: IndexMap<String, String>,
    pub unmatched: BTreeSet<String>,
    pub unseen_countries: BTreeSet<String>,
}

impl WorldMap {
    pub fn value(&self, country: &str) -> Option<f64> {
        self.values.iter().find(|v| v.name == country).map(|v| v.value)
    }
}

/// Country names present in a TopoJSON world atlas
#[derive(Debug, Clone, Default)]
pub struct WorldAtlas {
    country_names: HashSet<String>,
}

#[derive(Deserialize)]
struct TopoJson {
    objects: TopoObjects,
}

#[derive(Deserialize)]
struct TopoObjects {
    countries: TopoGeometryCollection,
}

#[derive(Deserialize)]
struct TopoGeometryCollection {
    #[serde(default)]
    geometries: Vec<TopoGeometry>,
}

#[derive(Deserialize)]
struct TopoGeometry {
    #[serde(default)]
    properties: Option<TopoProperties>,
}

#[derive(Deserialize)]
struct TopoProperties {
    #[serde(default)]
    name: Option<String>,
}

impl WorldAtlas {
    pub fn from_topojson(bytes: &[u8]) -> Result<Self> {
        let topo: TopoJson = serde_json::from_slice(bytes)?;
        let country_names = topo
            .objects
            .countries
            .geometries
            .into_iter()
            .filter_map(|g| g.properties.and_then(|p| p.name))
            .collect();
        Ok(Self { country_names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            country_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, country: &str) -> bool {
        self.country_names.contains(country)
    }

    pub fn len(&self) -> usize {
        self.country_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.country_names.is_empty()
    }
}

/// Lookup tables from spoken languages to the countries that speak them
#[derive(Debug, Clone, Default)]
pub struct LanguageGeography {
    /// country name -> language name -> share of speakers (0..=1), every alias
    country_languages: IndexMap<String, IndexMap<String, f64>>,
    /// Same, keyed by the first name of each language code only
    country_primary_languages: IndexMap<String, IndexMap<String, f64>>,
    language_countries: IndexMap<String, Vec<String>>,
}

impl LanguageGeography {
    pub fn new(
        country_codes: &[CountryCode],
        language_codes: &LanguageCodes,
        shares: &CountryLanguageShares,
    ) -> Self {
        let language_names: IndexMap<&str, Vec<&str>> = language_codes
            .iter()
            .map(|(code, names)| (code.as_str(), names.split(';').map(str::trim).collect()))
            .collect();

        let mut country_languages: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();
        let mut country_primary_languages: IndexMap<String, IndexMap<String, f64>> = IndexMap::new();

        for country in country_codes {
            let Some(country_shares) = shares.get(&country.code) else {
                continue;
            };
            let all_names = country_languages.entry(country.name.clone()).or_default();
            let primary = country_primary_languages.entry(country.name.clone()).or_default();

            for (language_code, share) in country_shares {
                let Some(names) = language_names.get(language_code.as_str()) else {
                    continue;
                };
                let proportion = share.percent / 100.0;
                if let Some(first) = names.first() {
                    primary.insert(first.to_string(), proportion);
                }
                for name in names {
                    all_names.insert(name.to_string(), proportion);
                }
            }
        }

        // Every language listed for a country counts, whatever its share
        let mut language_countries: IndexMap<String, Vec<String>> = IndexMap::new();
        for (country, languages) in &country_languages {
            for language in languages.keys() {
                language_countries
                    .entry(language.clone())
                    .or_default()
                    .push(country.clone());
            }
        }

        Self {
            country_languages,
            country_primary_languages,
            language_countries,
        }
    }

    pub fn countries_for(&self, language: &str) -> Option<&[String]> {
        self.language_countries.get(language).map(Vec::as_slice)
    }

    pub fn proportion(&self, country: &str, language: &str) -> f64 {
        self.country_languages
            .get(country)
            .and_then(|languages| languages.get(language))
            .copied()
            .unwrap_or(0.0)
    }

    /// `Country: <name>` followed by the primary languages spoken by at least 5%
    pub fn tooltip(&self, country: &str) -> String {
        let spoken: Vec<String> = self
            .country_primary_languages
            .get(country)
            .map(|languages| {
                languages
                    .iter()
                    .filter(|(_, proportion)| **proportion >= SPOKEN_LANGUAGE_TOOLTIP_THRESHOLD)
                    .map(|(language, proportion)| format!("{} ({:.0}%)", language, proportion * 100.0))
                    .collect()
            })
            .unwrap_or_default();

        if spoken.is_empty() {
            format!("Country: {}\n", country)
        } else {
            format!("Country: {}\nSpoken Languages: {}", country, spoken.join(", "))
        }
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.country_languages.keys().map(String::as_str)
    }
}

/// Weight each country by the share of its speakers for every record language
pub fn language_map(
    records: &[NormalizedDatasetRecord],
    geography: &LanguageGeography,
    atlas: Option<&WorldAtlas>,
) -> WorldMap {
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    let mut unmatched = BTreeSet::new();

    for record in records {
        for language in &record.languages {
            match geography.countries_for(language) {
                Some(countries) => {
                    for country in countries {
                        *totals.entry(country.clone()).or_insert(0.0) +=
                            geography.proportion(country, language);
                    }
                }
                None => {
                    unmatched.insert(language.clone());
                }
            }
        }
    }

    let mut map = finish(LANGUAGE_MAP_TITLE, totals, unmatched, atlas);
    map.tooltips = geography
        .countries()
        .map(|country| (country.to_string(), geography.tooltip(country)))
        .collect();
    map
}

/// Count creators per country through the country -> creators table
pub fn creator_map(
    records: &[NormalizedDatasetRecord],
    creator_countries: &GroupTable,
    atlas: Option<&WorldAtlas>,
) -> WorldMap {
    let mut countries_by_creator: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for (country, creators) in creator_countries {
        for creator in creators {
            countries_by_creator
                .entry(creator.as_str())
                .or_default()
                .push(country.as_str());
        }
    }

    let mut totals: IndexMap<String, f64> = IndexMap::new();
    let mut unmatched = BTreeSet::new();

    for record in records {
        for creator in &record.creators {
            match countries_by_creator.get(creator.as_str()) {
                Some(countries) => {
                    for country in countries {
                        *totals.entry(country.to_string()).or_insert(0.0) += 1.0;
                    }
                }
                None => {
                    unmatched.insert(creator.clone());
                }
            }
        }
    }

    finish(CREATOR_MAP_TITLE, totals, unmatched, atlas)
}

fn finish(
    title: &str,
    totals: IndexMap<String, f64>,
    unmatched: BTreeSet<String>,
    atlas: Option<&WorldAtlas>,
) -> WorldMap {
    let max = totals.values().copied().fold(0.0_f64, f64::max);

    let values: Vec<CountryValue> = totals
        .into_iter()
        .filter(|(_, total)| *total > 0.0)
        .map(|(name, total)| CountryValue {
            name,
            value: total / max,
        })
        .collect();

    let unseen_countries: BTreeSet<String> = match atlas {
        Some(atlas) => values
            .iter()
            .filter(|v| !atlas.contains(&v.name))
            .map(|v| v.name.clone())
            .collect(),
        None => BTreeSet::new(),
    };

    if !unmatched.is_empty() {
        debug!(chart = title, unmatched = ?unmatched, "Values without a country mapping");
    }
    if !unseen_countries.is_empty() {
        debug!(chart = title, unseen = ?unseen_countries, "Countries missing from the world atlas");
    }

    WorldMap {
        title: title.to_string(),
        values,
        tooltips: IndexMap::new(),
        unmatched,
        unseen_countries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::{DefaultNormalizer, Normalizer};
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<NormalizedDatasetRecord> {
        DefaultNormalizer::default().normalize(&serde_json::from_value(value).unwrap())
    }

    fn geography() -> LanguageGeography {
        let country_codes: Vec<CountryCode> = serde_json::from_value(json!([
            {"code": "FR", "name": "France"},
            {"code": "CA", "name": "Canada"},
            {"code": "AQ", "name": "Antarctica"}
        ]))
        .unwrap();
        let language_codes: LanguageCodes = serde_json::from_value(json!({
            "fr": "French; Francais",
            "en": "English"
        }))
        .unwrap();
        let shares: CountryLanguageShares = serde_json::from_value(json!({
            "FR": {"fr": {"percent": 100.0}, "en": {"percent": 2.0}},
            "CA": {"en": {"percent": 60.0}, "fr": {"percent": 40.0}}
        }))
        .unwrap();
        LanguageGeography::new(&country_codes, &language_codes, &shares)
    }

    #[test]
    fn test_language_map_weights_and_normalizes() {
        let records = records(json!({
            "a": {"Dataset Name": "a", "Languages": ["French", "English"]},
            "b": {"Dataset Name": "b", "Languages": ["Klingon"]}
        }));

        let map = language_map(&records, &geography(), None);

        // France: 1.0 + 0.02, Canada: 0.4 + 0.6
        let france = map.value("France").unwrap();
        let canada = map.value("Canada").unwrap();
        assert!((france - 1.0).abs() < 1e-9);
        assert!((canada - 1.0 / 1.02).abs() < 1e-9);
        assert!(map.values.iter().all(|v| v.value > 0.0 && v.value <= 1.0));
        assert_eq!(map.unmatched.iter().collect::<Vec<_>>(), vec!["Klingon"]);
        assert_eq!(map.title, "Language Distribution");
    }

    #[test]
    fn test_language_aliases_map_to_same_countries() {
        let geography = geography();
        assert_eq!(
            geography.countries_for("Francais"),
            Some(&["France".to_string(), "Canada".to_string()][..])
        );
        assert!(geography.countries_for("Antarctic").is_none());
    }

    #[test]
    fn test_tooltip_uses_primary_names_above_threshold() {
        let geography = geography();
        assert_eq!(
            geography.tooltip("France"),
            "Country: France\nSpoken Languages: French (100%)"
        );
        assert_eq!(
            geography.tooltip("Canada"),
            "Country: Canada\nSpoken Languages: English (60%), French (40%)"
        );
    }

    #[test]
    fn test_creator_map_counts_and_reports_unseen() {
        let records = records(json!({
            "a": {"Dataset Name": "a", "Creators": ["AI2", "Mila"]},
            "b": {"Dataset Name": "b", "Creators": ["AI2", "Garage Lab"]}
        }));
        let creator_countries: GroupTable = serde_json::from_value(json!({
            "United States of America": ["AI2"],
            "Canada": ["Mila", "AI2"]
        }))
        .unwrap();
        let atlas = WorldAtlas::from_names(["Canada", "France"]);

        let map = creator_map(&records, &creator_countries, Some(&atlas));

        assert_eq!(map.value("Canada"), Some(1.0));
        assert_eq!(map.value("United States of America"), Some(2.0 / 3.0));
        assert!(map.unmatched.contains("Garage Lab"));
        assert_eq!(
            map.unseen_countries.iter().collect::<Vec<_>>(),
            vec!["United States of America"]
        );
        assert!(map.tooltips.is_empty());
    }

    #[test]
    fn test_atlas_reads_country_names() {
        let atlas = WorldAtlas::from_topojson(
            json!({
                "type": "Topology",
                "objects": {"countries": {"type": "GeometryCollection", "geometries": [
                    {"type": "Polygon", "properties": {"name": "France"}},
                    {"type": "Polygon"}
                ]}}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(atlas.len(), 1);
        assert!(atlas.contains("France"));
    }

    #[test]
    fn test_empty_records_give_empty_map() {
        let map = language_map(&[], &geography(), None);
        assert!(map.values.is_empty());
        assert!(map.unmatched.is_empty());
    }
}
