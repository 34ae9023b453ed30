use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::analysis::correlation::CorrelationPolicy;
use crate::data::encoding::{resolve_label, DEFAULT_ENCODINGS};
use crate::data::loader::IngestOptions;
use crate::data::source::{FetchLimits, DEFAULT_MAX_FETCH_BYTES};
use crate::data::ColumnLayout;
use crate::types::LayoutVariant;

pub const DEFAULT_CONFIG_PATH: &str = "config/analysis.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Either a named export variant or an explicit column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayoutSetting {
    Variant(LayoutVariant),
    Custom(ColumnLayout),
}

impl LayoutSetting {
    pub fn to_layout(&self) -> ColumnLayout {
        match self {
            LayoutSetting::Variant(variant) => ColumnLayout::variant(*variant),
            LayoutSetting::Custom(layout) => layout.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub source: String,
    pub layout: LayoutSetting,
    pub encodings: Vec<String>,
    pub fetch_timeout_secs: u64,
    pub max_fetch_bytes: u64,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: "data/night_futures.csv".to_string(),
            layout: LayoutSetting::Variant(LayoutVariant::Upload),
            encodings: DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect(),
            fetch_timeout_secs: 30,
            max_fetch_bytes: DEFAULT_MAX_FETCH_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub preview_rows: usize,
    pub json_output: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            json_output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub cache_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { cache_capacity: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub analysis: CorrelationPolicy,
    pub report: ReportSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise falls back to built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let policy = &self.analysis;
        if !(policy.alpha > 0.0 && policy.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.alpha must be in (0, 1), got {}",
                policy.alpha
            )));
        }
        if !(0.0 <= policy.moderate && policy.moderate <= policy.strong && policy.strong <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "strength thresholds must satisfy 0 <= moderate ({}) <= strong ({}) <= 1",
                policy.moderate, policy.strong
            )));
        }
        if self.data.max_fetch_bytes == 0 {
            return Err(ConfigError::Invalid(
                "data.max_fetch_bytes must be positive".to_string(),
            ));
        }
        if self.data.encodings.is_empty() {
            return Err(ConfigError::Invalid(
                "data.encodings must list at least one encoding".to_string(),
            ));
        }
        for label in &self.data.encodings {
            resolve_label(label).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        self.data
            .layout
            .to_layout()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            layout: self.data.layout.to_layout(),
            encodings: self.data.encodings.clone(),
        }
    }

    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            timeout: Duration::from_secs(self.data.fetch_timeout_secs),
            max_bytes: self.data.max_fetch_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnRole;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.analysis, CorrelationPolicy::default());
        assert_eq!(config.session.cache_capacity, 1);
        assert_eq!(config.data.encodings, vec!["utf-8", "cp949", "euc-kr"]);
        assert_eq!(config.ingest_options().layout, ColumnLayout::variant(LayoutVariant::Upload));
    }

    #[test]
    fn test_named_and_custom_layouts() {
        let config = Config::from_yaml_str("data:\n  layout: bundled\n").unwrap();
        assert_eq!(
            config.ingest_options().layout,
            ColumnLayout::variant(LayoutVariant::Bundled)
        );

        let yaml = "data:\n  layout:\n    columns: [date, index_value, ignore, night_futures, day_futures, day_spot]\n    unit_row: true\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        let layout = config.ingest_options().layout;
        assert_eq!(layout.width(), 6);
        assert_eq!(layout.columns[2], ColumnRole::Ignore);
        assert!(layout.unit_row);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_yaml_str("analysis:\n  alpha: 1.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml_str("analysis:\n  strong: 0.2\n  moderate: 0.5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml_str("data:\n  max_fetch_bytes: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml_str("data:\n  encodings: [utf-8, not-an-encoding]\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml_str("data:\n  layout:\n    columns: [date, index_value]\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "report:\n  preview_rows: 3\nlogging:\n  level: debug").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.report.preview_rows, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_shipped_configuration_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
        let config = Config::load(path).unwrap();
        assert_eq!(config.data.layout, LayoutSetting::Variant(LayoutVariant::Upload));
        assert_eq!(config.fetch_limits().timeout, Duration::from_secs(30));
        assert_eq!(config.fetch_limits().max_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("does/not/exist.yaml").unwrap();
        assert_eq!(config.report.preview_rows, 10);
    }
}
