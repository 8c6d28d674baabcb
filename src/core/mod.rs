pub mod engine;
pub mod progress;
pub mod session;

pub use crate::domain::model::{DayEntry, RosterDocument, WeekEntry, Weekday};
pub use crate::domain::ports::{ClipboardSink, RosterExtractor, Storage};
pub use crate::domain::request::{ExtractionRequest, StagedFile};
pub use crate::utils::error::Result;
