use std::fmt;
use thiserror::Error;

/// Why an extraction attempt failed. Only ever logged; the user sees one
/// collapsed message for every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Service { status: u16 },
    EmptyResponse,
    MalformedJson,
    MissingCredential,
    InvalidPayload,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => write!(f, "transport"),
            FailureKind::Service { status } => write!(f, "service status {}", status),
            FailureKind::EmptyResponse => write!(f, "empty response"),
            FailureKind::MalformedJson => write!(f, "malformed json"),
            FailureKind::MissingCredential => write!(f, "missing credential"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
        }
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("No roster source supplied: paste text or stage a file")]
    MissingInput,

    #[error("Text input is disabled while a file is staged")]
    InputLocked,

    #[error("An extraction is already in progress")]
    ExtractionPending,

    #[error("Operation '{operation}' is not allowed while {state}")]
    InvalidState { operation: String, state: String },

    #[error("Extraction failed ({kind}): {detail}")]
    Extraction { kind: FailureKind, detail: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Session,
    Extraction,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Shown for every extraction failure regardless of cause.
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Roster extraction failed. Please check that the source document is sharp and legible.";

pub const MISSING_INPUT_MESSAGE: &str = "Please paste roster text or import a roster document.";

impl RosterError {
    pub fn extraction(kind: FailureKind, detail: impl Into<String>) -> Self {
        RosterError::Extraction {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_state(operation: &str, state: impl fmt::Display) -> Self {
        RosterError::InvalidState {
            operation: operation.to_string(),
            state: state.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RosterError::MissingInput | RosterError::InputLocked => ErrorCategory::Input,
            RosterError::ExtractionPending | RosterError::InvalidState { .. } => {
                ErrorCategory::Session
            }
            RosterError::Extraction { .. }
            | RosterError::HttpError(_)
            | RosterError::SerializationError(_) => ErrorCategory::Extraction,
            RosterError::ConfigError { .. }
            | RosterError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            RosterError::IoError(_) | RosterError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Session => ErrorSeverity::Low,
            ErrorCategory::Input | ErrorCategory::Extraction => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Extraction => EXTRACTION_FAILED_MESSAGE.to_string(),
            _ if matches!(self, RosterError::MissingInput) => MISSING_INPUT_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RosterError::MissingInput => "Pass --file <PATH>, --text <TEXT> or --text-file <PATH>",
            RosterError::InputLocked => {
                "Reset the session before typing text, or keep the staged file"
            }
            RosterError::ExtractionPending => "Wait for the running extraction to finish",
            RosterError::InvalidState { .. } => "Reset the session and start again",
            RosterError::Extraction {
                kind: FailureKind::MissingCredential,
                ..
            } => "Set GEMINI_API_KEY (or API_KEY) or service.api_key in the config file",
            RosterError::Extraction { .. }
            | RosterError::HttpError(_)
            | RosterError::SerializationError(_) => {
                "Retry with a sharper scan, or paste the roster as text"
            }
            RosterError::ConfigError { .. } | RosterError::InvalidConfigValueError { .. } => {
                "Check the command line flags and the TOML config file"
            }
            RosterError::IoError(_) | RosterError::CsvError(_) => {
                "Check that the paths exist and are readable/writable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
