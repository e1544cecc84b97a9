use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{Analyzer, AnalyzerThresholds};
use crate::error::{PromptCostError, Result};
use crate::pricing::{default_catalog, CostThresholds, ModelPricing};
use crate::tokens::OUTPUT_RATIO;

/// Default config file name.
pub const CONFIG_FILE: &str = "promptcost.toml";

/// Top-level configuration for promptcost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output tokens expected per input token.
    pub output_ratio: f64,
    /// Requests per day used when `project` gets no `--per-day`.
    pub default_frequency: u64,
    pub cost_thresholds: CostThresholds,
    pub analyzer: AnalyzerThresholds,
    pub store: StoreConfig,
    /// Pricing catalog override. Empty means the built-in catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelPricing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the prompt history files.
    pub path: Option<PathBuf>,
}

// --- Defaults ---

impl Default for Config {
    fn default() -> Self {
        Self {
            output_ratio: OUTPUT_RATIO,
            default_frequency: 100,
            cost_thresholds: CostThresholds::default(),
            analyzer: AnalyzerThresholds::default(),
            store: StoreConfig::default(),
            models: Vec::new(),
        }
    }
}

// --- Config methods ---

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptCostError::io(format!("reading config from '{}'", path.display()), e)
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| PromptCostError::config_with_source("failed to parse config", e))?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from an explicit path or the first discovered file, falling
    /// back to defaults when none exists.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            if !p.exists() {
                return Err(PromptCostError::config(format!(
                    "config file '{}' does not exist",
                    p.display()
                )));
            }
        }
        match find_config_file(explicit) {
            Some(p) => Config::load(&p),
            None => Ok(Config::default()),
        }
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| PromptCostError::config_with_source("failed to serialize config", e))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PromptCostError::io(
                        format!("creating config directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }
        std::fs::write(path, content).map_err(|e| {
            PromptCostError::io(format!("writing config to '{}'", path.display()), e)
        })
    }

    /// Validate config values.
    ///
    /// The cost engine tolerates any catalog; this is where a bad catalog
    /// from a config file gets rejected.
    pub fn validate(&self) -> Result<()> {
        if !self.output_ratio.is_finite() || self.output_ratio < 0.0 {
            return Err(PromptCostError::validation(
                "output_ratio",
                "must be a non-negative number",
            ));
        }
        if self.default_frequency == 0 {
            return Err(PromptCostError::validation(
                "default_frequency",
                "must be greater than 0",
            ));
        }

        let t = &self.cost_thresholds;
        if [t.cheap, t.moderate, t.expensive]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(PromptCostError::validation(
                "cost_thresholds",
                "must be non-negative numbers",
            ));
        }
        if !(t.cheap <= t.moderate && t.moderate <= t.expensive) {
            return Err(PromptCostError::validation(
                "cost_thresholds",
                "must be ascending: cheap <= moderate <= expensive",
            ));
        }

        let a = &self.analyzer;
        let ratios = [
            ("analyzer.repetition_issue", a.repetition_issue),
            ("analyzer.repetition_high", a.repetition_high),
            ("analyzer.verbosity_words_per_sentence", a.verbosity_words_per_sentence),
            ("analyzer.verbosity_scale", a.verbosity_scale),
            ("analyzer.verbosity_issue", a.verbosity_issue),
            ("analyzer.verbosity_high", a.verbosity_high),
        ];
        if let Some((field, _)) = ratios.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PromptCostError::validation(*field, "must be a finite number"));
        }
        if a.verbosity_scale <= 0.0 {
            return Err(PromptCostError::validation(
                "analyzer.verbosity_scale",
                "must be greater than 0",
            ));
        }
        if a.large_tokens > a.large_tokens_high {
            return Err(PromptCostError::validation(
                "analyzer.large_tokens",
                "must not exceed large_tokens_high",
            ));
        }

        for (i, model) in self.models.iter().enumerate() {
            if model.name.trim().is_empty() {
                return Err(PromptCostError::validation("models.name", "must not be empty"));
            }
            for rate in [model.input_cost_per_1k, model.output_cost_per_1k] {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(PromptCostError::validation(
                        format!("models.{}", model.name),
                        "costs must be non-negative numbers",
                    ));
                }
            }
            if self.models[..i].iter().any(|m| m.name == model.name) {
                return Err(PromptCostError::validation(
                    format!("models.{}", model.name),
                    "duplicate model name",
                ));
            }
        }
        Ok(())
    }

    /// The active pricing catalog.
    pub fn catalog(&self) -> &[ModelPricing] {
        if self.models.is_empty() {
            default_catalog()
        } else {
            &self.models
        }
    }

    /// An analyzer wired to this config's catalog and thresholds.
    pub fn analyzer(&self) -> Analyzer<'_> {
        Analyzer::new(self.catalog())
            .with_cost_thresholds(self.cost_thresholds)
            .with_thresholds(self.analyzer.clone())
            .with_output_ratio(self.output_ratio)
    }
}

/// Builder for constructing Config with selective overrides.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_output_ratio(mut self, ratio: f64) -> Self {
        self.config.output_ratio = ratio;
        self
    }

    pub fn with_models(mut self, models: Vec<ModelPricing>) -> Self {
        self.config.models = models;
        self
    }

    pub fn with_cost_thresholds(mut self, thresholds: CostThresholds) -> Self {
        self.config.cost_thresholds = thresholds;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the config file using standard search order:
/// 1. Explicit path (if provided)
/// 2. ./promptcost.toml
/// 3. ~/.promptcost.toml
/// 4. XDG config dir
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        return None;
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    if let Some(home) = dirs_home() {
        let home_config = home.join(format!(".{CONFIG_FILE}"));
        if home_config.exists() {
            return Some(home_config);
        }
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "promptcost") {
        let xdg = proj_dirs.config_dir().join(CONFIG_FILE);
        if xdg.exists() {
            return Some(xdg);
        }
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_uses_builtin_catalog() {
        assert_eq!(Config::default().catalog(), default_catalog());
    }

    #[test]
    fn serde_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(
            r##"
output_ratio = 2.0

[cost_thresholds]
moderate = 0.04

[[models]]
name = "Local"
input_cost_per_1k = 0.0
output_cost_per_1k = 0.0
color = "#000000"
provider = "Self-hosted"
"##,
        )
        .unwrap();
        assert_eq!(parsed.output_ratio, 2.0);
        assert_eq!(parsed.cost_thresholds.cheap, 0.01);
        assert_eq!(parsed.cost_thresholds.moderate, 0.04);
        assert_eq!(parsed.catalog().len(), 1);
        assert_eq!(parsed.analyzer, AnalyzerThresholds::default());
    }

    #[test]
    fn validation_rejects_negative_cost() {
        let err = ConfigBuilder::new()
            .with_models(vec![ModelPricing::new("Bad", -0.1, 0.0, "#000", "x")])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn validation_rejects_duplicate_names() {
        let err = ConfigBuilder::new()
            .with_models(vec![
                ModelPricing::new("Twin", 0.1, 0.1, "#000", "x"),
                ModelPricing::new("Twin", 0.2, 0.2, "#000", "y"),
            ])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn validation_rejects_descending_thresholds() {
        let result = ConfigBuilder::new()
            .with_cost_thresholds(CostThresholds {
                cheap: 0.1,
                moderate: 0.05,
                expensive: 0.2,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn validation_rejects_bad_ratio() {
        assert!(ConfigBuilder::new().with_output_ratio(f64::NAN).build().is_err());
        assert!(ConfigBuilder::new().with_output_ratio(-1.0).build().is_err());
    }

    #[test]
    fn validation_rejects_non_finite_analyzer_thresholds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[analyzer]\nverbosity_scale = nan\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("analyzer.verbosity_scale"));

        std::fs::write(&path, "[analyzer]\nrepetition_issue = inf\n").unwrap();
        assert!(Config::load(&path).unwrap_err().is_user_error());
    }

    #[test]
    fn analyzer_uses_config_ratio() {
        let config = ConfigBuilder::new().with_output_ratio(2.0).build().unwrap();
        let analyzer = config.analyzer();
        assert_eq!(analyzer.output_ratio, 2.0);
        assert_eq!(analyzer.catalog.len(), default_catalog().len());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let config = ConfigBuilder::new()
            .with_store_path(dir.path().join("store"))
            .with_models(vec![ModelPricing::new("Only", 0.5, 1.5, "#123456", "Solo")])
            .build()
            .unwrap();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn discover_errors_on_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::discover(Some(&missing)).is_err());
    }
}
