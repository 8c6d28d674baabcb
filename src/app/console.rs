use crate::app::export::{copy_roster, roster_csv, roster_json, save_text};
use crate::app::input::load_document;
use crate::app::render_view;
use crate::core::engine::{interrupted, ExtractionEngine, RunOutcome};
use crate::core::progress::ProgressObserver;
use crate::core::session::{Phase, Session, ViewMode};
use crate::domain::model::RosterDocument;
use crate::domain::ports::{ClipboardSink, RosterExtractor, Storage};
use crate::utils::error::{Result, RosterError};
use crate::utils::validation::validate_path;
use chrono::NaiveDate;
use std::io::{BufRead, Write};

pub const HELP: &str = "\
Commands:
  text <line>        append a line of roster text (disabled while a file is staged)
  file <path>        stage a PDF or image, replacing any staged file and clearing text
  submit             send the staged input for extraction (Ctrl-C stops waiting)
  view calendar|json switch the result view
  show               print the current view again
  copy               copy the roster JSON to the clipboard
  save <path>        write the roster JSON to a file
  csv <path>         write one CSV row per roster day
  status             show what is staged and the session state
  reset              clear input and result
  quit               leave (Ctrl-D works too)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn displayed_roster<'a>(session: &'a Session, operation: &str) -> Result<&'a RosterDocument> {
    session
        .roster()
        .ok_or_else(|| RosterError::invalid_state(operation, session.phase()))
}

/// Line-driven front-end over a [`Session`].
pub struct Console<E, C, S>
where
    E: RosterExtractor + 'static,
    C: ClipboardSink,
    S: Storage,
{
    engine: ExtractionEngine<E>,
    session: Session,
    clipboard: C,
    storage: S,
    start_date: Option<NaiveDate>,
}

impl<E, C, S> Console<E, C, S>
where
    E: RosterExtractor + 'static,
    C: ClipboardSink,
    S: Storage,
{
    pub fn new(engine: ExtractionEngine<E>, clipboard: C, storage: S) -> Self {
        Self {
            engine,
            session: Session::new(),
            clipboard,
            storage,
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub async fn run<R, W, O>(&mut self, input: R, out: &mut W, progress: &mut O) -> Result<()>
    where
        R: BufRead,
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        writeln!(out, "Roster extraction console. Type 'help' for commands.")?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.execute(&line, out, progress).await {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => {
                    tracing::debug!("Command '{}' failed: {}", line.trim(), e);
                    writeln!(out, "! {}", e.user_friendly_message())?;
                }
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub async fn execute<W, O>(&mut self, line: &str, out: &mut W, progress: &mut O) -> Result<Flow>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        let line = line.trim();
        let (command, argument) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => {}
            "help" | "?" => writeln!(out, "{}", HELP)?,
            "text" => {
                self.session.append_text(argument)?;
                writeln!(out, "Text: {} characters", self.session.text().chars().count())?;
            }
            "file" => {
                let file = load_document(&self.storage, argument).await?;
                if !file.is_supported_type() {
                    writeln!(out, "Warning: {} is not a PDF or an image", file.name)?;
                }
                let summary = format!("Staged {} ({})", file.name, file.mime_type);
                self.session.stage_file(file)?;
                writeln!(out, "{}", summary)?;
            }
            "submit" | "go" => self.submit(out, progress).await?,
            "view" => {
                let mode = match argument {
                    "calendar" => ViewMode::Calendar,
                    "json" => ViewMode::Json,
                    other => {
                        writeln!(out, "Unknown view '{}': use calendar or json", other)?;
                        return Ok(Flow::Continue);
                    }
                };
                self.session.set_view(mode)?;
                self.show(out)?;
            }
            "show" => self.show(out)?,
            "copy" => {
                copy_roster(displayed_roster(&self.session, "copy")?, &mut self.clipboard)?;
                writeln!(out, "Roster JSON copied to the clipboard.")?;
            }
            "save" => {
                validate_path("path", argument)?;
                let json = roster_json(displayed_roster(&self.session, "save")?)?;
                save_text(&self.storage, argument, &json).await?;
                writeln!(out, "Saved {}", argument)?;
            }
            "csv" => {
                validate_path("path", argument)?;
                let roster = displayed_roster(&self.session, "export csv")?;
                let csv = roster_csv(roster, self.start_date)?;
                save_text(&self.storage, argument, &csv).await?;
                writeln!(out, "Saved {}", argument)?;
            }
            "status" => self.status(out)?,
            "reset" => {
                self.session.reset();
                writeln!(out, "Session cleared.")?;
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            other => writeln!(out, "Unknown command '{}'. Type 'help'.", other)?,
        }
        Ok(Flow::Continue)
    }

    async fn submit<W, O>(&mut self, out: &mut W, progress: &mut O) -> Result<()>
    where
        W: Write,
        O: ProgressObserver + ?Sized,
    {
        let outcome = self
            .engine
            .run_until(&mut self.session, progress, interrupted())
            .await?;

        match outcome {
            RunOutcome::Interrupted => writeln!(out, "Extraction abandoned; session reset.")?,
            RunOutcome::Completed(_) => match self.session.phase() {
                Phase::Success { .. } => self.show(out)?,
                Phase::Failed { message } => writeln!(out, "! {}", message)?,
                _ => {}
            },
        }
        Ok(())
    }

    fn show<W: Write>(&self, out: &mut W) -> Result<()> {
        match (self.session.roster(), self.session.view()) {
            (Some(roster), Some(view)) => write!(out, "{}", render_view(roster, view)?)?,
            _ => writeln!(out, "Nothing to show yet.")?,
        }
        Ok(())
    }

    fn status<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "State: {}", self.session.phase())?;
        match self.session.staged_file() {
            Some(file) => writeln!(out, "File: {} ({})", file.name, file.mime_type)?,
            None => writeln!(out, "File: none")?,
        }
        let input_state = if self.session.text_input_enabled() {
            "enabled"
        } else {
            "disabled"
        };
        writeln!(
            out,
            "Text: {} characters ({})",
            self.session.text().chars().count(),
            input_state
        )?;
        if let Some(message) = self.session.error_message() {
            writeln!(out, "Error: {}", message)?;
        }
        Ok(())
    }
}
