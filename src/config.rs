use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::KNOWN_GENERATORS;
use crate::error::{ChartError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "PROVENANCE_CHARTS_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub constants: ConstantsConfig,
    pub geography: GeographyConfig,
    pub normalize: NormalizeConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path or URL of the data summary JSON
    pub summary: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            summary: "data/data_summary.json".to_string(),
        }
    }
}

/// Locations of the group and license reference tables. Unset tables disable
/// the charts and filters that need them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstantsConfig {
    pub task_groups: Option<String>,
    pub creator_groups: Option<String>,
    pub domain_groups: Option<String>,
    pub language_groups: Option<String>,
    pub creator_countries: Option<String>,
    pub license_classes: Option<String>,
    pub custom_license_classes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeographyConfig {
    pub country_codes: Option<String>,
    pub language_codes: Option<String>,
    pub country_language_codes: Option<String>,
    pub world_atlas: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub known_generators: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            known_generators: KNOWN_GENERATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("charts"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_name: "provenance-charts.log".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, `PROVENANCE_CHARTS_CONFIG`, or
    /// `config.toml`. Only the implicit default path may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ChartError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [data]
            summary = "https://example.org/data_summary.json"

            [constants]
            task_groups = "constants/task_groups.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.data.summary, "https://example.org/data_summary.json");
        assert_eq!(
            config.constants.task_groups.as_deref(),
            Some("constants/task_groups.json")
        );
        assert!(config.constants.creator_groups.is_none());
        assert_eq!(config.normalize.known_generators.len(), 4);
        assert_eq!(config.output.dir, PathBuf::from("charts"));
    }

    #[test]
    fn test_from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ndir = \"out\"\n[normalize]\nknown_generators = [\"X\"]").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.normalize.known_generators, vec!["X".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/provenance.toml"))).unwrap_err();
        assert!(matches!(err, ChartError::Config(_)));
    }
}
