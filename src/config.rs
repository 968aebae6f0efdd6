use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::batch::BatchOptions;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_PROMPT};
use crate::pipeline::PipelineOptions;

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub languages: Option<Vec<String>>,
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
    pub pacing_secs: Option<f64>,
    pub output: Option<PathBuf>,
    pub include_transcript: Option<bool>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub base_url: Option<String>,
    pub excel_bom: Option<bool>,
}

impl Config {
    /// Load config from ~/.config/ytsheet/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    /// Load an explicitly named config file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {}", path.display());
        let content =
            std::fs::read_to_string(path).wrap_err_with(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content).wrap_err_with(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsheet")
        .join("config.toml")
}

/// Fully resolved run settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub languages: Vec<String>,
    pub model: String,
    pub prompt_template: String,
    pub pacing: Duration,
    pub output: PathBuf,
    pub include_transcript: bool,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    pub base_url: String,
    pub excel_bom: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            languages: vec!["pt".to_string(), "en".to_string()],
            model: DEFAULT_MODEL.to_string(),
            prompt_template: DEFAULT_PROMPT.to_string(),
            pacing: Duration::from_secs(5),
            output: PathBuf::from("analysis.csv"),
            include_transcript: true,
            temperature: 0.3,
            max_output_tokens: 4096,
            timeout: Duration::from_secs(120),
            base_url: DEFAULT_BASE_URL.to_string(),
            excel_bom: false,
        }
    }
}

impl Settings {
    /// Apply a config file on top of the defaults
    pub fn from_config(config: Config) -> Result<Self> {
        let defaults = Settings::default();

        let prompt_template = match (config.prompt_file, config.prompt) {
            (Some(path), _) => read_prompt(&path)?,
            (None, Some(prompt)) => prompt,
            (None, None) => defaults.prompt_template,
        };

        let languages = config
            .languages
            .map(|langs| split_languages(&langs))
            .filter(|langs| !langs.is_empty())
            .unwrap_or(defaults.languages);

        let pacing = match config.pacing_secs {
            Some(secs) => Duration::try_from_secs_f64(secs).wrap_err("pacing_secs must be a non-negative number")?,
            None => defaults.pacing,
        };

        Ok(Self {
            languages,
            model: config.model.unwrap_or(defaults.model),
            prompt_template,
            pacing,
            output: config.output.unwrap_or(defaults.output),
            include_transcript: config.include_transcript.unwrap_or(defaults.include_transcript),
            temperature: config.temperature.unwrap_or(defaults.temperature),
            max_output_tokens: config.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            timeout: config.timeout_secs.map(Duration::from_secs).unwrap_or(defaults.timeout),
            base_url: config.base_url.unwrap_or(defaults.base_url),
            excel_bom: config.excel_bom.unwrap_or(defaults.excel_bom),
        })
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            languages: self.languages.clone(),
            prompt_template: self.prompt_template.clone(),
            include_transcript: self.include_transcript,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            pipeline: self.pipeline_options(),
            pacing: self.pacing,
            excel_bom: self.excel_bom,
        }
    }
}

pub fn read_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("reading prompt file {}", path.display()))
}

/// Flatten `["pt,en", " es "]` into `["pt", "en", "es"]`
pub fn split_languages(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
