//! Shared configuration loader for the folio toolchain.
//!
//! `defaults/folio.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`FolioConfig`].
//! Each section converts into the settings type of the crate that consumes it.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use folio_babel::formats::{HtmlOptions, HtmlTheme, MarkdownOptions};
use folio_babel::{EditorMode, FormatRegistry, ParserSettings};
use folio_editor::{AutoSaveSettings, SwitcherSettings};
use folio_sync::{BackoffConfig, SyncSettings};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TOML: &str = include_str!("../defaults/folio.default.toml");

/// Top-level configuration consumed by folio applications.
#[derive(Debug, Clone, Deserialize)]
pub struct FolioConfig {
    pub editor: EditorConfig,
    pub autosave: AutoSaveConfig,
    pub sync: SyncConfig,
    pub parser: ParserConfig,
    pub export: ExportConfig,
}

impl FolioConfig {
    /// The built-in formats, with section parsing and the HTML theme taken
    /// from this configuration.
    pub fn format_registry(&self) -> FormatRegistry {
        FormatRegistry::new((&self.parser).into(), self.export.html.theme)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub default_mode: EditorMode,
    pub history_limit: usize,
    pub seed_template: bool,
}

impl From<&EditorConfig> for SwitcherSettings {
    fn from(config: &EditorConfig) -> Self {
        SwitcherSettings {
            history_limit: config.history_limit,
            seed_template: config.seed_template,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub debounce_ms: u64,
}

impl From<&AutoSaveConfig> for AutoSaveSettings {
    fn from(config: &AutoSaveConfig) -> Self {
        AutoSaveSettings {
            enabled: config.enabled,
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub reorder_window_ms: u64,
    pub backoff: BackoffSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackoffSection {
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: f64,
}

impl From<&BackoffSection> for BackoffConfig {
    fn from(config: &BackoffSection) -> Self {
        BackoffConfig {
            initial: Duration::from_millis(config.initial_ms),
            max: Duration::from_millis(config.max_ms),
            multiplier: config.multiplier,
        }
    }
}

impl From<&SyncConfig> for SyncSettings {
    fn from(config: &SyncConfig) -> Self {
        SyncSettings {
            reorder_window: Duration::from_millis(config.reorder_window_ms),
            backoff: (&config.backoff).into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub words_per_minute: u32,
}

impl From<&ParserConfig> for ParserSettings {
    fn from(config: &ParserConfig) -> Self {
        ParserSettings {
            words_per_minute: config.words_per_minute,
        }
    }
}

/// Format-specific export knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub html: HtmlExportConfig,
    pub markdown: MarkdownExportConfig,
}

impl ExportConfig {
    /// Serializer options for `format`, as the format registry expects them.
    pub fn format_options(&self, format: &str) -> HashMap<String, String> {
        let mut options = HashMap::new();
        match format {
            "html" => {
                options.insert("theme".to_string(), self.html.theme.as_str().to_string());
                if let Some(css) = &self.html.custom_css {
                    options.insert("css".to_string(), css.clone());
                }
            }
            "markdown" => {
                options.insert(
                    "front-matter".to_string(),
                    self.markdown.front_matter.to_string(),
                );
            }
            _ => {}
        }
        options
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HtmlExportConfig {
    pub theme: HtmlTheme,
    #[serde(default)]
    pub custom_css: Option<String>,
}

impl From<&HtmlExportConfig> for HtmlOptions {
    fn from(config: &HtmlExportConfig) -> Self {
        HtmlOptions {
            theme: config.theme,
            custom_css: config.custom_css.clone(),
            fragment: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownExportConfig {
    pub front_matter: bool,
}

impl From<&MarkdownExportConfig> for MarkdownOptions {
    fn from(config: &MarkdownExportConfig) -> Self {
        MarkdownOptions {
            front_matter: config.front_matter,
        }
    }
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
    pub fn build(self) -> Result<FolioConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<FolioConfig, ConfigError> {
    Loader::new().build()
}
