//! Configuration model loaded from external sources.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::processing::response::VerdictRule;
use crate::processing::{EnrichOptions, TariffStrategy};
use crate::{DEFAULT_CONCURRENCY, MAX_CANDIDATES};

/// Default location of the optional configuration file, without extension.
pub const DEFAULT_CONFIG_FILE: &str = "config/enricher";

/// Output file used when none is configured and the input is not replaced.
pub const DEFAULT_OUTPUT_PATH: &str = "notifications_enriched.json";

fn default_input_path() -> PathBuf {
    PathBuf::from("notifications.json")
}

fn default_tariff_path() -> PathBuf {
    PathBuf::from("HSN_SAC_Enriched.xlsx")
}

fn default_code_column() -> String {
    "HSN_CD".to_string()
}

fn default_description_column() -> String {
    "HSN_Description".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_candidate_cap() -> usize {
    MAX_CANDIDATES
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
/// Settings for one enrichment run.
pub struct EnricherConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    /// When unset, the per-code strategy rewrites `input_path` in place and
    /// the batch strategy writes [`DEFAULT_OUTPUT_PATH`].
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_tariff_path")]
    pub tariff_path: PathBuf,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_description_column")]
    pub description_column: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    #[serde(default)]
    pub tariff_strategy: TariffStrategy,
    #[serde(default)]
    pub verdict_rule: VerdictRule,
    #[serde(default = "default_true")]
    pub match_references: bool,
}

impl EnricherConfig {
    /// Loads the optional YAML file at `path` (extension may be omitted) and
    /// overlays `ENRICHER_*` environment variables.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("ENRICHER").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            strategy: self.tariff_strategy,
            candidate_cap: self.candidate_cap.min(MAX_CANDIDATES),
            verdict_rule: self.verdict_rule,
            match_references: self.match_references,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Where the enriched collection is written.
    pub fn resolved_output_path(&self) -> PathBuf {
        match (&self.output_path, self.tariff_strategy) {
            (Some(path), _) => path.clone(),
            (None, TariffStrategy::PerCode) => self.input_path.clone(),
            (None, TariffStrategy::Batch) => PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}
