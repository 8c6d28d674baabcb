pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{GeminiConfig, GeminiExtractor};
pub use crate::config::{cli::LocalStorage, ToolConfig};
pub use crate::core::{engine::ExtractionEngine, session::Session};
pub use crate::domain::model::{DayEntry, RosterDocument, WeekEntry, Weekday};
pub use crate::utils::error::{Result, RosterError};
