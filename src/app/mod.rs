// Presentation layer: views of a roster, exports, progress display and the console front-end.

pub mod calendar;
pub mod console;
pub mod export;
pub mod input;
pub mod progress_view;

use crate::core::session::ViewMode;
use crate::domain::model::RosterDocument;
use crate::domain::ports::{ClipboardSink, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::io::Write;

pub fn render_view(roster: &RosterDocument, view: ViewMode) -> Result<String> {
    match view {
        ViewMode::Calendar => Ok(calendar::render_calendar(roster)),
        ViewMode::Json => {
            let mut json = export::roster_json(roster)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// What a one-shot run does with a successful extraction.
#[derive(Debug, Clone, Default)]
pub struct PresentOptions {
    pub view: ViewMode,
    pub output: Option<String>,
    pub csv: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub copy: bool,
}

pub async fn present<W, C, S>(
    roster: &RosterDocument,
    options: &PresentOptions,
    out: &mut W,
    clipboard: &mut C,
    storage: &S,
) -> Result<()>
where
    W: Write,
    C: ClipboardSink + ?Sized,
    S: Storage,
{
    write!(out, "{}", render_view(roster, options.view)?)?;
    out.flush()?;

    if options.copy {
        export::copy_roster(roster, clipboard)?;
    }
    if let Some(path) = &options.output {
        export::save_text(storage, path, &export::roster_json(roster)?).await?;
    }
    if let Some(path) = &options.csv {
        export::save_text(storage, path, &export::roster_csv(roster, options.start_date)?).await?;
    }
    Ok(())
}
