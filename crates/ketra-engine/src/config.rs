//! Configuration management for the Ketra engine.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with KETRA_ prefix)
//! 3. .env files
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ketra_explore::ExplorerConfig;
use ketra_sim::{ABSOLUTE_MAX_QUBITS, memory_bytes};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Circuit registry limits
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Design explorer parameters
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

/// Limits applied by the circuit registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum qubits per circuit. A circuit needs `16 × 2^max_qubits` bytes.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: u32,

    /// Maximum number of live circuits (unbounded if absent)
    #[serde(default)]
    pub max_circuits: Option<usize>,

    /// Maximum summed amplitude memory across live circuits, in bytes
    #[serde(default)]
    pub memory_budget_bytes: Option<u64>,

    /// Check the norm after every gate batch
    #[serde(default)]
    pub check_drift: bool,

    /// Norm deviation above which a drift warning is logged
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance: f64,
}

// Default value functions
fn default_max_qubits() -> u32 {
    30 // 16 GiB per circuit
}

fn default_drift_tolerance() -> f64 {
    1e-9
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_circuits: None,
            memory_budget_bytes: None,
            check_drift: false,
            drift_tolerance: default_drift_tolerance(),
        }
    }
}

impl EngineConfig {
    /// Bytes needed by one circuit of `num_qubits` qubits (`16 × 2^n`).
    pub fn memory_for_qubits(num_qubits: u32) -> u64 {
        memory_bytes(num_qubits)
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_yaml_str(&contents)
    }

    /// Parse configuration from a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    /// 3. Load .env file if it exists
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge process environment variables into this configuration.
    fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge variables from `lookup` into this configuration.
    ///
    /// Only variables that are present and parse override the current values.
    pub fn merge_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Registry
        if let Some(v) = parse_var(lookup("KETRA_MAX_QUBITS")) {
            self.registry.max_qubits = v;
        }
        if let Some(v) = parse_var(lookup("KETRA_MAX_CIRCUITS")) {
            self.registry.max_circuits = Some(v);
        }
        if let Some(v) = parse_var(lookup("KETRA_MEMORY_BUDGET_BYTES")) {
            self.registry.memory_budget_bytes = Some(v);
        }
        if let Some(v) = lookup("KETRA_CHECK_DRIFT") {
            self.registry.check_drift = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = parse_var(lookup("KETRA_DRIFT_TOLERANCE")) {
            self.registry.drift_tolerance = v;
        }

        // Explorer
        if let Some(v) = parse_var(lookup("KETRA_EXPLORER_SHARPNESS")) {
            self.explorer.sharpness = v;
        }
        if let Some(v) = parse_var(lookup("KETRA_EXPLORER_INTERFERENCE")) {
            self.explorer.interference_strength = v;
        }
        if let Some(v) = parse_var(lookup("KETRA_EXPLORER_TUNNELING")) {
            self.explorer.tunneling_probability = v;
        }
        if let Some(v) = parse_var(lookup("KETRA_EXPLORER_TEMPERATURE")) {
            self.explorer.tunneling_temperature = v;
        }
        if let Some(v) = parse_var(lookup("KETRA_EXPLORER_SEED")) {
            self.explorer.seed = Some(v);
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.registry;

        if registry.max_qubits == 0 || registry.max_qubits > ABSOLUTE_MAX_QUBITS {
            return Err(ConfigError::ValidationError(format!(
                "max_qubits must be between 1 and {ABSOLUTE_MAX_QUBITS}, got {}",
                registry.max_qubits
            )));
        }

        if registry.max_circuits == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_circuits must be greater than 0; omit the field for no limit".to_string(),
            ));
        }

        if registry.memory_budget_bytes == Some(0) {
            return Err(ConfigError::ValidationError(
                "memory_budget_bytes must be greater than 0; omit the field for no limit"
                    .to_string(),
            ));
        }

        if !(registry.drift_tolerance.is_finite() && registry.drift_tolerance > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "drift_tolerance must be positive, got {}",
                registry.drift_tolerance
            )));
        }

        self.explorer
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn parse_var<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.registry.max_qubits, 30);
        assert_eq!(config.registry.max_circuits, None);
        assert!(!config.registry.check_drift);
        assert_eq!(config.explorer, ExplorerConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_formula() {
        assert_eq!(EngineConfig::memory_for_qubits(1), 32);
        assert_eq!(EngineConfig::memory_for_qubits(10), 16 * 1024);
        assert_eq!(EngineConfig::memory_for_qubits(30), 16 << 30);
    }

    #[test]
    fn test_yaml_partial_uses_defaults() {
        let config = EngineConfig::from_yaml_str(
            "registry:\n  max_qubits: 12\n  max_circuits: 4\nexplorer:\n  seed: 9\n",
        )
        .unwrap();
        assert_eq!(config.registry.max_qubits, 12);
        assert_eq!(config.registry.max_circuits, Some(4));
        assert_eq!(config.registry.drift_tolerance, 1e-9);
        assert_eq!(config.explorer.seed, Some(9));
        assert_eq!(config.explorer.sharpness, 100.0);
    }

    #[test]
    fn test_yaml_rejects_invalid_values() {
        let err = EngineConfig::from_yaml_str("registry:\n  max_qubits: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = EngineConfig::from_yaml_str("explorer:\n  tunneling_probability: 2.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = EngineConfig::from_yaml_str("registry: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::default().merge_vars(lookup(&[
            ("KETRA_MAX_QUBITS", "16"),
            ("KETRA_MAX_CIRCUITS", "8"),
            ("KETRA_MEMORY_BUDGET_BYTES", "1048576"),
            ("KETRA_CHECK_DRIFT", "true"),
            ("KETRA_EXPLORER_SEED", "77"),
            ("KETRA_EXPLORER_TUNNELING", "0.25"),
            ("KETRA_EXPLORER_TEMPERATURE", "3.5"),
        ]));
        assert_eq!(config.registry.max_qubits, 16);
        assert_eq!(config.registry.max_circuits, Some(8));
        assert_eq!(config.registry.memory_budget_bytes, Some(1 << 20));
        assert!(config.registry.check_drift);
        assert_eq!(config.explorer.seed, Some(77));
        assert_eq!(config.explorer.tunneling_probability, 0.25);
        assert_eq!(config.explorer.tunneling_temperature, 3.5);
    }

    #[test]
    fn test_unparseable_env_is_ignored() {
        let config = EngineConfig::default().merge_vars(lookup(&[("KETRA_MAX_QUBITS", "lots")]));
        assert_eq!(config.registry.max_qubits, 30);
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/ketra.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
