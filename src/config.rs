//! Configuration management for TaskTrak
//!
//! This module provides configuration structures and defaults for the event
//! log schema, the terminal interface and logging.

use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming a configuration file
pub const CONFIG_ENV_VAR: &str = "TASKTRAK_CONFIG";

/// Global configuration for TaskTrak
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskTrakConfig {
    /// Event log schema configuration
    pub schema: SchemaConfig,
    /// UI configuration
    pub ui: UiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How events in the controller log are classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Field carrying the event role
    pub role_field: String,
    /// Role value marking an employee clocking in
    pub context_start: String,
    /// Role value marking an employee clocking out
    pub context_end: String,
}

/// Configuration for the terminal interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Input poll interval in milliseconds
    pub tick_rate_ms: u64,
    /// Rows moved by PgUp/PgDn
    pub page_scroll: usize,
    /// Shade every other table row
    pub alternating_rows: bool,
}

/// Configuration for log output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used while the TUI owns the terminal
    pub file: Option<PathBuf>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            role_field: "sts".to_string(),
            context_start: "IN".to_string(),
            context_end: "OUT".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            page_scroll: 10,
            alternating_rows: true,
        }
    }
}

impl UiConfig {
    /// Get input poll duration
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

/// Configuration loading and management
impl TaskTrakConfig {
    /// Load configuration from an explicit file, `$TASKTRAK_CONFIG`, or defaults,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("TASKTRAK_ROLE_FIELD") {
            self.schema.role_field = val;
        }

        if let Ok(val) = std::env::var("TASKTRAK_CONTEXT_START") {
            self.schema.context_start = val;
        }

        if let Ok(val) = std::env::var("TASKTRAK_CONTEXT_END") {
            self.schema.context_end = val;
        }

        if let Ok(val) = std::env::var("TASKTRAK_TICK_RATE_MS") {
            match val.parse::<u64>() {
                Ok(ms) => self.ui.tick_rate_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid TASKTRAK_TICK_RATE_MS: {}", val),
            }
        }

        if let Ok(val) = std::env::var("TASKTRAK_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(val));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let schema = &self.schema;
        if schema.role_field.is_empty() {
            return Err("role_field must not be empty".to_string());
        }

        if schema.context_start.is_empty() || schema.context_end.is_empty() {
            return Err("context markers must not be empty".to_string());
        }

        if schema.context_start == schema.context_end {
            return Err("context_start and context_end must differ".to_string());
        }

        if self.ui.tick_rate_ms == 0 {
            return Err("tick_rate_ms must be greater than 0".to_string());
        }

        if self.ui.page_scroll == 0 {
            return Err("page_scroll must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TaskTrakConfig::default();

        assert_eq!(config.schema.role_field, "sts");
        assert_eq!(config.schema.context_start, "IN");
        assert_eq!(config.schema.context_end, "OUT");
        assert_eq!(config.ui.page_scroll, 10);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = TaskTrakConfig::default();
        assert!(config.validate().is_ok());

        config.schema.context_end = "IN".to_string();
        assert!(config.validate().is_err());

        config.schema.context_end = "OUT".to_string();
        config.ui.tick_rate_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TaskTrakConfig = toml::from_str(
            r#"
            [schema]
            context_start = "LOGIN"

            [ui]
            alternating_rows = false
            "#,
        )
        .unwrap();

        assert_eq!(config.schema.context_start, "LOGIN");
        assert_eq!(config.schema.context_end, "OUT");
        assert!(!config.ui.alternating_rows);
        assert_eq!(config.ui.tick_rate(), Duration::from_millis(250));
    }

    #[test]
    fn test_from_file_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TaskTrakConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn test_env_config_loading() {
        std::env::set_var("TASKTRAK_CONTEXT_END", "CLOCKOUT");
        std::env::set_var("TASKTRAK_TICK_RATE_MS", "not-a-number");

        let config = TaskTrakConfig::from_env();

        assert_eq!(config.schema.context_end, "CLOCKOUT");
        assert_eq!(config.ui.tick_rate_ms, 250);

        // Cleanup
        std::env::remove_var("TASKTRAK_CONTEXT_END");
        std::env::remove_var("TASKTRAK_TICK_RATE_MS");
    }
}
