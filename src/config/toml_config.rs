use crate::adapters::gemini::{
    Credential, GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_THINKING_BUDGET,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::progress::DEFAULT_STEP_INTERVAL;
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const MAX_THINKING_BUDGET: u32 = 32768;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub thinking_budget: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressConfig {
    pub step_interval_ms: Option<u64>,
}

impl ToolConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(RosterError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RosterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RosterError::ConfigError {
            message: format!("placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn endpoint(&self) -> &str {
        self.service.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn model(&self) -> &str {
        self.service.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn thinking_budget(&self) -> u32 {
        self.service.thinking_budget.unwrap_or(DEFAULT_THINKING_BUDGET)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn step_interval(&self) -> Duration {
        self.progress
            .step_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_STEP_INTERVAL)
    }

    /// Explicit key when one is configured, otherwise the environment at call time.
    /// A placeholder left unresolved counts as "not configured".
    pub fn credential(&self) -> Credential {
        match self.service.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !key.starts_with("${") => {
                Credential::Key(key.to_string())
            }
            _ => Credential::default(),
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            endpoint: self.endpoint().to_string(),
            model: self.model().to_string(),
            thinking_budget: self.thinking_budget(),
            timeout: self.timeout(),
            credential: self.credential(),
        }
    }
}

impl Validate for ToolConfig {
    fn validate(&self) -> Result<()> {
        validate_url("service.endpoint", self.endpoint())?;
        validate_non_empty_string("service.model", self.model())?;
        validate_range(
            "service.thinking_budget",
            self.thinking_budget(),
            0,
            MAX_THINKING_BUDGET,
        )?;
        validate_range(
            "service.timeout_seconds",
            self.timeout().as_secs(),
            1,
            3600,
        )?;
        validate_range(
            "progress.step_interval_ms",
            self.step_interval().as_millis() as u64,
            100,
            60_000,
        )?;
        Ok(())
    }
}
