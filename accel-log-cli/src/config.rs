//! Configuration loading and parsing

use accel_log_parser::EngineConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub segmentation: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write one report per input file into this directory instead of stdout
    pub output_dir: Option<PathBuf>,
    /// Include raw samples in JSON reports
    #[serde(default)]
    pub include_samples: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Txt,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Txt => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .segmentation
        .validate()
        .with_context(|| format!("Invalid [segmentation] section in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            files = ["wear_day1.txt", "wear_day2.txt"]

            [segmentation]
            activation_threshold = 0.25
            min_session_duration_secs = 2.0

            [output]
            format = "json"
            include_samples = true
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.files.len(), 2);
        assert_eq!(config.segmentation.activation_threshold, 0.25);
        assert_eq!(config.segmentation.min_session_duration_secs, 2.0);
        assert_eq!(config.segmentation.max_malformed_examples, 10);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.include_samples);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.files.is_empty());
        assert_eq!(config.segmentation, EngineConfig::default());
        assert_eq!(config.output.format, OutputFormat::Txt);
        assert!(config.output.output_dir.is_none());
    }

    #[test]
    fn test_load_config_rejects_bad_threshold() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[segmentation]\nactivation_threshold = -1.0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("activation_threshold"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("no/such/config.toml")).is_err());
    }
}
