//! Generator configuration types

use crate::annotation::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported config format: {0:?} (expected .toml or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Strategies to run (default: all recognized)
    #[serde(default = "default_strategies")]
    pub strategies: BTreeSet<Strategy>,

    /// Fixture expressions keyed by rendered type (`"Something"`, `"[Item]"`)
    ///
    /// Consulted before the built-in defaults when a stub needs a value.
    #[serde(default)]
    pub fixtures: BTreeMap<String, String>,

    /// Fail with `AmbiguousRegistration` when a contract has several implementations
    #[serde(default = "default_fail_on_ambiguous")]
    pub fail_on_ambiguous_registration: bool,

    /// Report DTO fields that have no counterpart in the domain type
    #[serde(default = "default_strict_source_fields")]
    pub strict_source_fields: bool,

    /// Prefix identifying marker comments (`// sourcery: autoStub`)
    #[serde(default = "default_marker_prefix")]
    pub marker_prefix: String,

    /// Worker threads for parsing and generation (0: available parallelism)
    #[serde(default)]
    pub jobs: usize,

    /// Name-convention table
    #[serde(default)]
    pub naming: NamingConvention,
}

fn default_strategies() -> BTreeSet<Strategy> {
    Strategy::ALL.into_iter().collect()
}

fn default_fail_on_ambiguous() -> bool {
    true
}

fn default_strict_source_fields() -> bool {
    true
}

fn default_marker_prefix() -> String {
    "sourcery:".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            fixtures: BTreeMap::new(),
            fail_on_ambiguous_registration: default_fail_on_ambiguous(),
            strict_source_fields: default_strict_source_fields(),
            marker_prefix: default_marker_prefix(),
            jobs: 0,
            naming: NamingConvention::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse configuration from JSON bytes; empty input yields the defaults
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Load and validate configuration, choosing the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json(content.as_bytes())?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Restrict the run to the given strategies
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies = strategies.into_iter().collect();
        self
    }

    /// Register a fixture expression for a rendered type
    pub fn with_fixture(mut self, ty: impl Into<String>, expression: impl Into<String>) -> Self {
        self.fixtures.insert(ty.into(), expression.into());
        self
    }

    pub fn is_enabled(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid("no strategies enabled".to_string()));
        }

        if self.marker_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "marker_prefix cannot be empty".to_string(),
            ));
        }

        for (ty, expression) in &self.fixtures {
            if ty.trim().is_empty() || expression.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "fixture entry `{ty}` needs a type and an expression"
                )));
            }
        }

        self.naming.validate()
    }
}

/// Suffix table used for DTO/domain and contract/implementation matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Suffixes appended to a domain name to find its DTO (`MyObject` → `MyObjectDTO`)
    #[serde(default = "default_dto_suffixes")]
    pub dto_suffixes: Vec<String>,

    /// Suffixes stripped from a contract name to get its stem (`SomeServiceProtocol` → `SomeService`)
    #[serde(default = "default_contract_suffixes")]
    pub contract_suffixes: Vec<String>,

    #[serde(default = "default_failing_mock_suffix")]
    pub failing_mock_suffix: String,

    #[serde(default = "default_stub_suffix")]
    pub stub_suffix: String,
}

fn default_dto_suffixes() -> Vec<String> {
    vec!["DTO".to_string(), "Dto".to_string()]
}

fn default_contract_suffixes() -> Vec<String> {
    vec!["Protocol".to_string(), "Interface".to_string()]
}

fn default_failing_mock_suffix() -> String {
    "FailingMock".to_string()
}

fn default_stub_suffix() -> String {
    "Stub".to_string()
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            dto_suffixes: default_dto_suffixes(),
            contract_suffixes: default_contract_suffixes(),
            failing_mock_suffix: default_failing_mock_suffix(),
            stub_suffix: default_stub_suffix(),
        }
    }
}

impl NamingConvention {
    /// Strip the first matching contract suffix, keeping at least one character
    pub fn contract_stem<'a>(&self, name: &'a str) -> &'a str {
        for suffix in &self.contract_suffixes {
            if let Some(stem) = name.strip_suffix(suffix.as_str()) {
                if !stem.is_empty() {
                    return stem;
                }
            }
        }
        name
    }

    /// Candidate DTO names for a domain type, in preference order
    pub fn dto_candidates(&self, domain: &str) -> Vec<String> {
        self.dto_suffixes
            .iter()
            .map(|suffix| format!("{domain}{suffix}"))
            .collect()
    }

    pub fn failing_mock_name(&self, contract: &str) -> String {
        format!("{}{}", self.contract_stem(contract), self.failing_mock_suffix)
    }

    pub fn stub_name(&self, contract: &str) -> String {
        format!("{}{}", self.contract_stem(contract), self.stub_suffix)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.dto_suffixes.iter().all(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(
                "naming.dto_suffixes needs at least one non-empty suffix".to_string(),
            ));
        }
        if self.contract_suffixes.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(
                "naming.contract_suffixes cannot contain an empty suffix".to_string(),
            ));
        }
        if self.failing_mock_suffix.is_empty() || self.stub_suffix.is_empty() {
            return Err(ConfigError::Invalid(
                "mock and stub suffixes cannot be empty".to_string(),
            ));
        }
        if self.failing_mock_suffix == self.stub_suffix {
            return Err(ConfigError::Invalid(
                "mock and stub suffixes must differ".to_string(),
            ));
        }
        Ok(())
    }
}
