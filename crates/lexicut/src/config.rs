//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from lexicut.toml)
//! - `~/.config/lexicut/lexicut.toml`
//! - `./lexicut.toml`

use config::{Config, File, FileFormat};
use lexicut_agent::AgentConfig;
use lexicut_assembly::SegmenterConfig;
use lexicut_cache::ResultCacheConfig;
use lexicut_error::{ConfigError, LexicutError, LexicutResult};
use lexicut_models::{DEFAULT_MODEL, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../lexicut.toml");

/// Reasoning-service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Request rounds per tool loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Output token cap per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Run the assembly cut after building a project
    #[serde(default = "default_assembly_cut")]
    pub assembly_cut: bool,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_iterations() -> usize {
    AgentConfig::default().max_iterations
}

fn default_max_tokens() -> u32 {
    AgentConfig::default().max_tokens
}

fn default_assembly_cut() -> bool {
    true
}

impl AgentSettings {
    /// Loop limits for [`AgentLoop`](lexicut_agent::AgentLoop).
    pub fn loop_config(&self) -> AgentConfig {
        AgentConfig {
            max_iterations: self.max_iterations,
            max_tokens: self.max_tokens,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_iterations: default_max_iterations(),
            max_tokens: default_max_tokens(),
            assembly_cut: default_assembly_cut(),
        }
    }
}

/// Where projects are saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Project directory; the platform data directory when unset
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,
}

impl StorageSettings {
    /// The configured directory, or `<data dir>/lexicut/projects`.
    pub fn resolve_projects_dir(&self) -> PathBuf {
        match &self.projects_dir {
            Some(dir) => dir.clone(),
            None => data_dir().join("projects"),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("lexicut"))
        .unwrap_or_else(|| PathBuf::from(".lexicut"))
}

/// Top-level Lexicut configuration.
///
/// # Example
///
/// ```no_run
/// use lexicut::LexicutConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = LexicutConfig::load()?;
/// println!("Agent model: {}", config.agent.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexicutConfig {
    /// Segmentation thresholds
    #[serde(default)]
    pub segmenter: SegmenterConfig,
    /// Reasoning-service settings
    #[serde(default)]
    pub agent: AgentSettings,
    /// Description retries
    #[serde(default)]
    pub describe: RetryPolicy,
    /// Project storage
    #[serde(default)]
    pub storage: StorageSettings,
    /// Collaborator result cache
    #[serde(default)]
    pub cache: ResultCacheConfig,
}

impl LexicutConfig {
    /// Load configuration from a specific file, on top of the bundled
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> LexicutResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::build(builder, path.as_ref().display().to_string())
    }

    /// Load configuration with precedence: current dir > home dir > bundled
    /// defaults.
    ///
    /// User config files are optional and skipped when absent.
    #[instrument]
    pub fn load() -> LexicutResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/lexicut/lexicut.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("lexicut").required(false));
        Self::build(builder, "layered sources".to_string())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        origin: String,
    ) -> LexicutResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| {
                LexicutError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    origin, e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                LexicutError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Override the tool-loop cap, re-validating the result.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `max_iterations` is zero.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> LexicutResult<Self> {
        self.agent.max_iterations = max_iterations;
        self.validate()?;
        Ok(self)
    }

    /// Persist the result cache to `<data dir>/lexicut/cache.json` unless
    /// `cache.path` is already set.
    pub fn with_default_cache_path(mut self) -> Self {
        if self.cache.path().is_none() {
            self.cache = self.cache.with_path(Some(data_dir().join("cache.json")));
        }
        self
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the offending field.
    pub fn validate(&self) -> LexicutResult<()> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::new("agent.max_iterations must be at least 1").into());
        }
        if self.agent.max_tokens == 0 {
            return Err(ConfigError::new("agent.max_tokens must be at least 1").into());
        }
        if self.segmenter.max_group_duration <= 0.0 {
            return Err(ConfigError::new("segmenter.max_group_duration must be positive").into());
        }
        if self.segmenter.min_sentence_duration < 0.0 || self.segmenter.min_group_duration < 0.0
        {
            return Err(ConfigError::new("segmenter durations must not be negative").into());
        }
        Ok(())
    }
}
