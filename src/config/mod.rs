pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub use toml_config::ToolConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ViewArg {
    #[default]
    Calendar,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "roster-extract")]
#[command(
    about = "Turn a scanned duty roster (PDF, image or text) into a structured weekly schedule"
)]
pub struct CliConfig {
    #[arg(short, long, help = "Roster document to upload (PDF or image)")]
    pub file: Option<PathBuf>,

    #[arg(short, long, help = "Raw roster text")]
    pub text: Option<String>,

    #[arg(long, help = "Read raw roster text from a file ('-' for stdin)")]
    pub text_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ViewArg::Calendar)]
    pub view: ViewArg,

    #[arg(short, long, help = "Write the roster JSON to this path")]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Write a flat CSV (one row per day) to this path")]
    pub csv: Option<PathBuf>,

    #[arg(long, help = "Date of week 1 Monday, used to date CSV rows (YYYY-MM-DD)")]
    pub start_date: Option<NaiveDate>,

    #[arg(long, help = "Copy the roster JSON to the clipboard")]
    pub copy: bool,

    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the extraction service endpoint")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Override the model name")]
    pub model: Option<String>,

    #[arg(long, help = "Override the thinking budget hint")]
    pub thinking_budget: Option<u32>,

    #[arg(short, long, help = "Interactive console")]
    pub interactive: bool,

    #[arg(long, help = "Hide the progress animation")]
    pub no_progress: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// TOML file (if any) with command line overrides applied on top.
    pub fn tool_config(&self) -> Result<ToolConfig> {
        let mut config = match &self.config {
            Some(path) => ToolConfig::from_file(path)?,
            None => ToolConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = Some(endpoint.clone());
        }
        if let Some(model) = &self.model {
            config.service.model = Some(model.clone());
        }
        if let Some(budget) = self.thinking_budget {
            config.service.thinking_budget = Some(budget);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn has_input(&self) -> bool {
        self.file.is_some() || self.text.is_some() || self.text_file.is_some()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let paths = [
            ("file", &self.file),
            ("text_file", &self.text_file),
            ("output", &self.output),
            ("csv", &self.csv),
            ("config", &self.config),
        ];
        for (field, path) in paths {
            if let Some(path) = path {
                validate_path(field, &path.to_string_lossy())?;
            }
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_flags() {
        let config = CliConfig::parse_from([
            "roster-extract",
            "--file",
            "roster.pdf",
            "--view",
            "json",
            "--start-date",
            "2025-01-06",
            "--copy",
        ]);
        assert_eq!(config.view, ViewArg::Json);
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert!(config.copy);
        assert!(config.has_input());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn flags_override_defaults() {
        let config = CliConfig::parse_from([
            "roster-extract",
            "--model",
            "gemini-2.5-pro",
            "--thinking-budget",
            "2048",
        ]);
        let tool = config.tool_config().unwrap();
        assert_eq!(tool.model(), "gemini-2.5-pro");
        assert_eq!(tool.thinking_budget(), 2048);
        assert!(!config.has_input());
    }

    #[test]
    fn invalid_endpoint_override_is_rejected() {
        let config = CliConfig::parse_from(["roster-extract", "--endpoint", "not a url"]);
        assert!(config.tool_config().is_err());
    }
}
