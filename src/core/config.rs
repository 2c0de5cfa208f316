//! Layered configuration
//!
//! Later layers win:
//! 1. built-in defaults
//! 2. user config (`<config dir>/iqc/config.yaml`)
//! 3. project config (`./.iqc/config.yaml`)
//! 4. an explicit `--config FILE`
//!
//! Layers are merged as raw YAML before deserializing, so a file only needs
//! the keys it overrides.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_yml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::capability::CapabilityThresholds;
use crate::core::subgroup::DEFAULT_SUBGROUP_SIZE;
use crate::yaml::{merge_yaml, read_yaml_value, YamlError};

/// Project-local config directory name
pub const PROJECT_CONFIG_DIR: &str = ".iqc";

/// Config file name inside each config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error, miette::Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("Invalid configuration value in {source_name}: {message}")]
    #[diagnostic(code(iqc::config::invalid))]
    Invalid {
        source_name: String,
        message: String,
    },

    #[error("Config file not found: {0}")]
    #[diagnostic(code(iqc::config::not_found))]
    NotFound(PathBuf),
}

/// Table extraction settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Sample size assumed when the document does not declare one
    pub default_sample_size: usize,

    /// Labels with fewer measurements than this are dropped
    pub min_measurements: usize,

    /// Cell texts that mark a location (header) row
    pub header_keywords: Vec<String>,

    /// Accept bare numbers (`1`, `12`) as location labels besides ①–⑳
    pub numeric_labels: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_sample_size: 60,
            min_measurements: 3,
            header_keywords: vec![
                "检验位置".to_string(),
                "检测位置".to_string(),
                "检测项目".to_string(),
                "Inspection Position".to_string(),
                "Location".to_string(),
            ],
            numeric_labels: true,
        }
    }
}

/// Statistical analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rational subgroup size for Xbar-R charts and σ_within
    pub subgroup_size: usize,

    /// Cpk at or above which a dimension is capable
    pub capable_cpk: f64,

    /// Cpk at or above which a dimension is acceptable
    pub acceptable_cpk: f64,

    /// Mean offset from nominal, as a fraction of the band, flagged as a
    /// centering problem
    pub centering_fraction: f64,

    /// k in the mean ± kσ outlier rule
    pub outlier_sigma: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let thresholds = CapabilityThresholds::default();
        Self {
            subgroup_size: DEFAULT_SUBGROUP_SIZE,
            capable_cpk: thresholds.capable_cpk,
            acceptable_cpk: thresholds.acceptable_cpk,
            centering_fraction: thresholds.centering_fraction,
            outlier_sigma: 3.0,
        }
    }
}

impl AnalysisConfig {
    pub fn thresholds(&self) -> CapabilityThresholds {
        CapabilityThresholds {
            capable_cpk: self.capable_cpk,
            acceptable_cpk: self.acceptable_cpk,
            centering_fraction: self.centering_fraction,
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// User-level config file, if the platform has a config directory
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "iqc").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Project-level config file relative to `dir`
    pub fn project_config_path(dir: &Path) -> PathBuf {
        dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Candidate config files in merge order (lowest priority first)
    pub fn search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(Self::project_config_path(&cwd));
        }
        if let Some(path) = explicit {
            paths.push(path.to_path_buf());
        }
        paths
    }

    /// Load the layered configuration.
    ///
    /// Missing user/project files are skipped; a missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }
        let layers: Vec<PathBuf> = Self::search_paths(explicit)
            .into_iter()
            .filter(|p| p.exists())
            .collect();
        Self::from_layers(&layers)
    }

    /// Merge the given files over the defaults, in order
    pub fn from_layers(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut merged = serde_yml::to_value(Config::default()).map_err(|e| {
            ConfigError::Invalid {
                source_name: "defaults".to_string(),
                message: e.to_string(),
            }
        })?;

        let mut last_source = "defaults".to_string();
        for path in paths {
            tracing::debug!(path = %path.display(), "loading config layer");
            let layer: Value = read_yaml_value(path)?;
            merge_yaml(&mut merged, layer);
            last_source = path.display().to_string();
        }

        let config: Config =
            serde_yml::from_value(merged).map_err(|e| ConfigError::Invalid {
                source_name: last_source.clone(),
                message: e.to_string(),
            })?;
        config.validate(&last_source)?;
        Ok(config)
    }

    /// Reject values that would make extraction or analysis meaningless
    pub fn validate(&self, source_name: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Invalid {
            source_name: source_name.to_string(),
            message,
        };

        if self.extraction.default_sample_size == 0 {
            return Err(invalid(
                "extraction.default_sample_size must be at least 1".into(),
            ));
        }
        if self.analysis.subgroup_size < 2 {
            return Err(invalid(format!(
                "analysis.subgroup_size must be at least 2 (got {})",
                self.analysis.subgroup_size
            )));
        }
        if self.analysis.acceptable_cpk > self.analysis.capable_cpk {
            return Err(invalid(format!(
                "analysis.acceptable_cpk ({}) exceeds analysis.capable_cpk ({})",
                self.analysis.acceptable_cpk, self.analysis.capable_cpk
            )));
        }
        if self.analysis.outlier_sigma <= 0.0 {
            return Err(invalid("analysis.outlier_sigma must be positive".into()));
        }
        if self.extraction.header_keywords.is_empty() {
            return Err(invalid(
                "extraction.header_keywords must not be empty".into(),
            ));
        }
        Ok(())
    }
}
