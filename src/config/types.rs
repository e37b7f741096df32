use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "hotReload.watchPatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Main translation table, relative to the game directory.
    pub translation_file: String,
    /// Global names table. `null` disables the fallback table.
    pub names_file: Option<String>,
    pub untranslated_log: String,

    /// Append each distinct missed string to `untranslatedLog`.
    pub dump_untranslated: bool,
    /// Log every translated dialogue line.
    pub text_logging: bool,

    pub wrap: WrapConfig,
    pub assets: AssetConfig,
    pub hot_reload: HotReloadConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WrapConfig {
    /// Column width for message translations. `0` disables wrapping.
    pub max_width: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetConfig {
    pub enabled: bool,
    pub replacement_root: String,
    /// Extension tried after the original one, without the dot.
    pub alternate_extension: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            replacement_root: "tl_assets".to_string(),
            alternate_extension: "png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotReloadConfig {
    pub watch_files: bool,
    /// File-name globs in the game directory, matched case-insensitively.
    /// The configured table files are always watched as well.
    pub watch_patterns: Vec<String>,
    pub hotkey: bool,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub shutdown_timeout_ms: u64,
}

impl Default for HotReloadConfig {
    fn default() -> Self {
        Self {
            watch_files: true,
            watch_patterns: vec!["translation.tsv".to_string(), "unique_names.tsv".to_string()],
            hotkey: true,
            poll_interval_ms: 50,
            debounce_ms: 100,
            shutdown_timeout_ms: 2000,
        }
    }
}

impl EngineSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Invalid extension or interval
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.translation_file.is_empty() {
            errors.push(ValidationError::new(
                "translationFile",
                "The path cannot be empty. Example: \"translation.tsv\"",
            ));
        }

        if let Some(names_file) = &self.names_file
            && names_file.is_empty()
        {
            errors.push(ValidationError::new(
                "namesFile",
                "The path cannot be empty. Please specify a file (e.g., \"unique_names.tsv\"), or set it to null",
            ));
        }

        if self.untranslated_log.is_empty() {
            errors.push(ValidationError::new(
                "untranslatedLog",
                "The path cannot be empty. Example: \"untranslated.tsv\"",
            ));
        }

        if self.assets.alternate_extension.is_empty() {
            errors.push(ValidationError::new(
                "assets.alternateExtension",
                "The extension cannot be empty. Example: \"png\"",
            ));
        } else if self.assets.alternate_extension.starts_with('.') {
            errors.push(ValidationError::new(
                "assets.alternateExtension",
                format!(
                    "Specify the extension without a leading dot (e.g., \"{}\")",
                    self.assets.alternate_extension.trim_start_matches('.')
                ),
            ));
        }

        if self.assets.enabled && self.assets.replacement_root.is_empty() {
            errors.push(ValidationError::new(
                "assets.replacementRoot",
                "The directory cannot be empty when asset replacement is enabled",
            ));
        }

        for (index, pattern) in self.hot_reload.watch_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("hotReload.watchPatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.hot_reload.poll_interval_ms == 0 {
            errors.push(ValidationError::new(
                "hotReload.pollIntervalMs",
                "The interval must be greater than 0",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            translation_file: "translation.tsv".to_string(),
            names_file: Some("unique_names.tsv".to_string()),
            untranslated_log: "untranslated.tsv".to_string(),
            dump_untranslated: false,
            text_logging: true,
            wrap: WrapConfig::default(),
            assets: AssetConfig::default(),
            hot_reload: HotReloadConfig::default(),
        }
    }
}
