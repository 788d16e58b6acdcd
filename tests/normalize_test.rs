use anyhow::Result;
use chrono::NaiveDate;

use provenance_charts::app::{LoadUseCase, NormalizeUseCase};
use provenance_charts::config::ConstantsConfig;
use provenance_charts::config::GeographyConfig;
use provenance_charts::infra::AssetLoader;
use provenance_charts::pipeline::filter::FilterCriteria;
use provenance_charts::pipeline::normalize::RecordField;

fn resource(name: &str) -> String {
    format!("{}/tests/resources/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn constants() -> ConstantsConfig {
    ConstantsConfig {
        language_groups: Some(resource("language_groups.json")),
        license_classes: Some(resource("license_classes.json")),
        custom_license_classes: Some(resource("custom_license_classes.json")),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_normalize_data_summary() -> Result<()> {
    let loader = LoadUseCase::new(Box::new(AssetLoader::default()));
    let raw = loader.load_registry(&resource("data_summary.json")).await?;
    assert_eq!(raw.len(), 4);

    let records = NormalizeUseCase::with_default_normalizer().normalize(&raw);

    let names: Vec<&str> = records.iter().map(|r| r.dataset_name.as_str()).collect();
    assert_eq!(names, vec!["squad", "alpaca", "xp3"]);

    let squad = &records[0];
    assert_eq!(squad.languages, vec!["English", "German"]);
    assert_eq!(squad.input_text_len, 120.0);
    assert_eq!(squad.target_text_len, 3.3);
    assert_eq!(squad.citation_count, 5421);
    assert_eq!(squad.download_count, 88000);
    assert_eq!(squad.date, NaiveDate::from_ymd_opt(2016, 6, 16));
    assert_eq!(squad.synthetic_class, "Regular");
    // no DataProvenance license fields until the classifier fills them in
    assert_eq!(squad.license_use_category, None);

    let alpaca = &records[1];
    assert_eq!(alpaca.synthetic, "Synthetic");
    assert_eq!(alpaca.synthetic_class, "Synthetic (OpenAI GPT-3)");
    assert_eq!(alpaca.target_text_len, 64.4);
    // missing PwC date defaults to 1900-1-1, which sorts first
    assert_eq!(alpaca.pwc_date, "1900-1-1");
    assert_eq!(alpaca.date, NaiveDate::from_ymd_opt(1900, 1, 1));

    let xp3 = &records[2];
    assert_eq!(xp3.input_text_len, 0.0);
    assert_eq!(
        RecordField::Creators.scalar(xp3).as_deref(),
        Some("BigScience,Independent Lab")
    );

    Ok(())
}

#[tokio::test]
async fn test_prepare_annotates_and_filters() -> Result<()> {
    let loader = LoadUseCase::new(Box::new(AssetLoader::default()));
    let raw = loader.load_registry(&resource("data_summary.json")).await?;
    let inputs = loader.load_inputs(&constants(), &GeographyConfig::default()).await?;
    let use_case = NormalizeUseCase::with_default_normalizer();

    let commercial = FilterCriteria {
        license_use: Some("Commercial".to_string()),
        ..Default::default()
    };
    let prepared = use_case.prepare(
        raw.clone(),
        inputs.license_classifier.as_ref(),
        &commercial,
        inputs.filter_tables(),
    )?;
    let keys: Vec<&str> = prepared.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["squad-en", "squad-de", "xp3-sw"]);

    let records = use_case.normalize(&prepared);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].license_use_category.as_deref(), Some("Commercial"));

    let english_only = FilterCriteria {
        languages: vec!["English".to_string()],
        ..Default::default()
    };
    let prepared = use_case.prepare(
        raw,
        inputs.license_classifier.as_ref(),
        &english_only,
        inputs.filter_tables(),
    )?;
    let keys: Vec<&str> = prepared.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["squad-en", "alpaca"]);
    assert_eq!(prepared["alpaca"].license_use.as_deref(), Some("non-commercial"));

    Ok(())
}

#[tokio::test]
async fn test_empty_criteria_keep_every_entry() -> Result<()> {
    let loader = LoadUseCase::new(Box::new(AssetLoader::default()));
    let raw = loader.load_registry(&resource("data_summary.json")).await?;
    let inputs = loader.load_inputs(&constants(), &GeographyConfig::default()).await?;

    let prepared = NormalizeUseCase::with_default_normalizer().prepare(
        raw.clone(),
        inputs.license_classifier.as_ref(),
        &FilterCriteria::default(),
        inputs.filter_tables(),
    )?;

    assert_eq!(
        prepared.keys().collect::<Vec<_>>(),
        raw.keys().collect::<Vec<_>>()
    );
    assert_eq!(prepared["squad-de"].license_share_alike, Some(1));
    Ok(())
}
