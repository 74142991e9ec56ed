//! Configuration management.
//!
//! Defaults are overridden by an optional TOML file and then by
//! `ETYMOROOT_*` environment variables.

use crate::observability::{LogFormat, LoggingConfig};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ETYMOROOT_";

/// Main configuration for etymoroot.
#[derive(Debug, Clone)]
pub struct EtymoConfig {
    /// Path to the `SQLite` history database.
    pub db_path: PathBuf,
    /// Path to the consensus family snapshot (`.json` or `.json.gz`).
    pub snapshot_path: PathBuf,
    /// Failures after which a word is excluded from selection.
    pub max_word_failures: u32,
    /// Age in days after which failure records are cleaned up.
    pub failure_retention_days: u32,
    /// Extraction settings.
    pub extraction: ExtractionSettings,
    /// Consensus settings.
    pub consensus: ConsensusSettings,
    /// Selection settings.
    pub selection: SelectionSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Extra ablaut rules appended to the built-in table.
    pub ablaut_rules: Vec<AblautRuleConfig>,
}

/// Headword hygiene for the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    /// Shortest headword considered.
    pub min_word_length: usize,
    /// Longest headword considered.
    pub max_word_length: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_word_length: 3,
            max_word_length: 15,
        }
    }
}

/// How the consensus builder picks one gloss among candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlossPolicy {
    /// The shortest candidate wins; ties go to the alphabetically first.
    #[default]
    Shortest,
    /// The candidate seen most often wins; ties fall back to `Shortest`.
    MostAttested,
}

impl GlossPolicy {
    /// Parses a policy name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown name.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "shortest" => Ok(Self::Shortest),
            "most_attested" | "most-attested" | "frequent" => Ok(Self::MostAttested),
            other => Err(Error::InvalidInput(format!(
                "unknown gloss policy '{other}', expected 'shortest' or 'most_attested'"
            ))),
        }
    }
}

/// Admission thresholds for root families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusSettings {
    /// Minimum distinct sources across the whole family.
    pub min_sources: usize,
    /// Minimum distinct words in the family.
    pub min_words: usize,
    /// Gloss selection heuristic.
    pub gloss_policy: GlossPolicy,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            min_sources: 2,
            min_words: 2,
            gloss_policy: GlossPolicy::Shortest,
        }
    }
}

/// Pair selection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionSettings {
    /// Whether affix-trivial pairs are eligible.
    pub include_trivial: bool,
}

/// One extra ablaut/orthographic equivalence rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AblautRuleConfig {
    /// Regex matched against the uppercased root.
    pub pattern: String,
    /// Replacement, `$1`-style group references allowed.
    pub replacement: String,
    /// Family label for auditing.
    #[serde(default)]
    pub family: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Database path.
    pub db_path: Option<String>,
    /// Snapshot path.
    pub snapshot_path: Option<String>,
    /// Failure threshold.
    pub max_word_failures: Option<u32>,
    /// Failure retention in days.
    pub failure_retention_days: Option<u32>,
    /// Extraction section.
    pub extraction: Option<ConfigFileExtraction>,
    /// Consensus section.
    pub consensus: Option<ConfigFileConsensus>,
    /// Selection section.
    pub selection: Option<ConfigFileSelection>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Extra ablaut rules.
    #[serde(default)]
    pub ablaut_rules: Vec<AblautRuleConfig>,
}

/// Extraction section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileExtraction {
    /// Shortest headword.
    pub min_word_length: Option<usize>,
    /// Longest headword.
    pub max_word_length: Option<usize>,
}

/// Consensus section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileConsensus {
    /// Minimum sources.
    pub min_sources: Option<usize>,
    /// Minimum words.
    pub min_words: Option<usize>,
    /// Gloss policy name.
    pub gloss_policy: Option<String>,
}

/// Selection section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSelection {
    /// Include affix-trivial pairs.
    pub include_trivial: Option<bool>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Default level filter.
    pub level: Option<String>,
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Optional log file.
    pub file: Option<String>,
}

impl Default for EtymoConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("etymoroot.sqlite"),
            snapshot_path: PathBuf::from("data/roots.json.gz"),
            max_word_failures: 3,
            failure_retention_days: 7,
            extraction: ExtractionSettings::default(),
            consensus: ConsensusSettings::default(),
            selection: SelectionSettings::default(),
            logging: LoggingConfig::default(),
            ablaut_rules: Vec::new(),
        }
    }
}

impl EtymoConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting values fail validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let config = Self::from_config_file(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Looks for `etymoroot/config.toml` in the platform config directory and
    /// returns defaults if no usable file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("etymoroot").join("config.toml");
        if platform_config.exists() {
            match Self::load_from_file(&platform_config) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %platform_config.display(),
                    error = %e,
                    "Ignoring unusable config file"
                ),
            }
        }

        Self::default()
    }

    /// Applies `ETYMOROOT_*` environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a numeric variable does not parse or
    /// the result fails validation.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Keys are the variable names without the [`ENV_PREFIX`]
    /// (`DB_PATH`, `SNAPSHOT_PATH`, `MAX_WORD_FAILURES`,
    /// `FAILURE_RETENTION_DAYS`, `LOG_LEVEL`, `INCLUDE_TRIVIAL`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a value does not parse or the
    /// result fails validation.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(path) = get("DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(path) = get("SNAPSHOT_PATH") {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(value) = get("MAX_WORD_FAILURES") {
            self.max_word_failures = parse_number("MAX_WORD_FAILURES", &value)?;
        }
        if let Some(value) = get("FAILURE_RETENTION_DAYS") {
            self.failure_retention_days = parse_number("FAILURE_RETENTION_DAYS", &value)?;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(value) = get("INCLUDE_TRIVIAL") {
            self.selection.include_trivial =
                matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }

        self.validate()?;
        Ok(self)
    }

    /// Checks that all thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.max_word_failures == 0 {
            return Err(Error::InvalidInput(
                "max_word_failures must be positive".into(),
            ));
        }
        if self.extraction.min_word_length == 0 {
            return Err(Error::InvalidInput(
                "extraction.min_word_length must be positive".into(),
            ));
        }
        if self.extraction.min_word_length > self.extraction.max_word_length {
            return Err(Error::InvalidInput(format!(
                "extraction.min_word_length ({}) exceeds max_word_length ({})",
                self.extraction.min_word_length, self.extraction.max_word_length
            )));
        }
        if self.consensus.min_sources == 0 {
            return Err(Error::InvalidInput(
                "consensus.min_sources must be positive".into(),
            ));
        }
        if self.consensus.min_words < 2 {
            return Err(Error::InvalidInput(
                "consensus.min_words must be at least 2".into(),
            ));
        }
        Ok(())
    }

    /// Converts a `ConfigFile` to `EtymoConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file.db_path {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = file.snapshot_path {
            config.snapshot_path = PathBuf::from(path);
        }
        if let Some(n) = file.max_word_failures {
            config.max_word_failures = n;
        }
        if let Some(days) = file.failure_retention_days {
            config.failure_retention_days = days;
        }
        if let Some(extraction) = file.extraction {
            if let Some(v) = extraction.min_word_length {
                config.extraction.min_word_length = v;
            }
            if let Some(v) = extraction.max_word_length {
                config.extraction.max_word_length = v;
            }
        }
        if let Some(consensus) = file.consensus {
            if let Some(v) = consensus.min_sources {
                config.consensus.min_sources = v;
            }
            if let Some(v) = consensus.min_words {
                config.consensus.min_words = v;
            }
            if let Some(policy) = consensus.gloss_policy {
                config.consensus.gloss_policy = GlossPolicy::parse(&policy)?;
            }
        }
        if let Some(selection) = file.selection {
            if let Some(v) = selection.include_trivial {
                config.selection.include_trivial = v;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }
        config.ablaut_rules = file.ablaut_rules;

        Ok(config)
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    /// Sets the snapshot path.
    #[must_use]
    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::InvalidInput(format!("{ENV_PREFIX}{name} must be a number, got '{value}'"))
    })
}
