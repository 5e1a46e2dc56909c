//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$SUMSHEET_CONFIG` environment variable
//! 2. `~/.config/sumsheet/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use sumsheet_core::{Operation, PaperSize, Presentation, Range, Settings};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub layout: LayoutConfig,
    pub quiz: QuizConfig,
    pub export: ExportConfig,
}

/// Problem generation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub operations: Vec<Operation>,
    pub num_min: i64,
    pub num_max: i64,
    pub result_min: i64,
    pub result_max: i64,
    pub operands_min: i64,
    pub operands_max: i64,
    pub allow_negative: bool,
    pub num_problems: usize,
}

/// Worksheet rendering settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub font_size: f32,
    pub line_spacing: f32,
    pub paper_size: PaperSize,
    pub show_answers: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Seconds; 0 disables the limit.
    pub time_limit_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for relative export paths. Default: the user's documents dir.
    pub output_dir: Option<String>,
}

// --- Defaults ---

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            operations: vec![Operation::Add, Operation::Subtract],
            num_min: 1,
            num_max: 20,
            result_min: 0,
            result_max: 100,
            operands_min: 2,
            operands_max: 2,
            allow_negative: false,
            num_problems: 20,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let p = Presentation::default();
        Self {
            font_size: p.font_size,
            line_spacing: p.line_spacing,
            paper_size: p.paper_size,
            show_answers: p.show_answers,
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 300,
        }
    }
}

impl LayoutConfig {
    pub fn presentation(&self) -> Presentation {
        Presentation {
            font_size: self.font_size,
            line_spacing: self.line_spacing,
            paper_size: self.paper_size,
            show_answers: self.show_answers,
        }
    }
}

/// Validate merged generation and layout values into [`Settings`].
pub fn build_settings(generation: &GenerationConfig, layout: &LayoutConfig) -> Result<Settings> {
    let settings = Settings::new(
        generation.operations.clone(),
        Range::new(generation.num_min, generation.num_max).context("operand range")?,
        Range::new(generation.result_min, generation.result_max).context("result range")?,
        Range::new(generation.operands_min, generation.operands_max)
            .context("operand count range")?,
        generation.num_problems,
    )?
    .with_allow_negative(generation.allow_negative)
    .with_presentation(layout.presentation())?;
    Ok(settings)
}

/// Config file location: `$SUMSHEET_CONFIG`, else
/// `~/.config/sumsheet/config.toml`. `None` only when no home directory
/// can be found.
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os("SUMSHEET_CONFIG")
        .map(PathBuf::from)
        .or_else(|| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".config").join("sumsheet").join("config.toml"))
        })
}

/// Read the sheet config at `path`. A missing file means built-in defaults;
/// an unreadable or malformed one is an error.
pub fn read_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path.filter(|p| p.exists()) else {
        return Ok(Config::default());
    };
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_config() -> Result<Config> {
    read_config(config_path().as_deref())
}

/// Where `sumsheet config` says the settings came from.
pub fn describe_config_source(path: Option<&Path>) -> String {
    match path {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (absent, built-in defaults)", p.display()),
        None => "built-in defaults (no home directory)".into(),
    }
}

/// Where relative export paths are resolved.
pub fn output_dir(config: &ExportConfig) -> PathBuf {
    if let Some(dir) = &config.output_dir {
        return PathBuf::from(dir);
    }
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
