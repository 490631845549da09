//! Shared configuration loader for the Nakamoto League toolkit.
//!
//! `defaults/nakamoto.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NakamotoConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use nakamoto_babel::{HtmlOptions, MarkdownOptions};
use nakamoto_reader::{EndpointSettings, TrackerSettings};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/nakamoto.default.toml");

/// File picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "nakamoto.toml";

/// Top-level configuration consumed by Nakamoto applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NakamotoConfig {
    pub convert: ConvertConfig,
    pub reading: ReadingConfig,
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub markdown: MarkdownConfig,
    pub html: HtmlConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub max_heading_level: usize,
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        MarkdownOptions {
            max_heading_level: config.max_heading_level,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlConfig {
    pub standalone: bool,
    pub title: String,
}

impl From<&HtmlConfig> for HtmlOptions {
    fn from(config: &HtmlConfig) -> Self {
        HtmlOptions {
            standalone: config.standalone,
            title: non_empty(&config.title),
        }
    }
}

/// Reading progress sampling and reporting.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingConfig {
    pub report_step: u8,
    pub milestone_step: u8,
    pub backstop_interval_secs: u64,
    pub notification_secs: u64,
    pub flush_timeout_ms: u64,
    pub suppress_duplicate_reports: bool,
    pub endpoint: EndpointConfig,
}

impl From<&ReadingConfig> for TrackerSettings {
    fn from(config: &ReadingConfig) -> Self {
        TrackerSettings {
            report_step: config.report_step.max(1),
            milestone_step: config.milestone_step.max(1),
            backstop_interval: Duration::from_secs(config.backstop_interval_secs.max(1)),
            notification_duration: Duration::from_secs(config.notification_secs),
            flush_timeout: Duration::from_millis(config.flush_timeout_ms),
            suppress_duplicate_reports: config.suppress_duplicate_reports,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub base_url: String,
    pub path: String,
    pub timeout_secs: u64,
    pub token: String,
}

impl EndpointConfig {
    /// Only a viewer with a token gets progress reported.
    pub fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl From<&EndpointConfig> for EndpointSettings {
    fn from(config: &EndpointConfig) -> Self {
        EndpointSettings {
            base_url: config.base_url.clone(),
            path: config.path.clone(),
            token: non_empty(&config.token),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<NakamotoConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NakamotoConfig, ConfigError> {
    Loader::new().build()
}
