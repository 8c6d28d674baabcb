use crate::core::progress::ProgressLog;
use crate::domain::model::RosterDocument;
use crate::domain::request::{ExtractionRequest, StagedFile};
use crate::utils::error::{Result, RosterError, MISSING_INPUT_MESSAGE};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Calendar,
    Json,
}

/// Identifies one submitted extraction. A completion is only applied while the
/// session is still pending on the same ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Pending { ticket: Ticket },
    Success { roster: RosterDocument, view: ViewMode },
    Failed { message: String },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Pending { .. } => write!(f, "an extraction is pending"),
            Phase::Success { .. } => write!(f, "a roster is displayed"),
            Phase::Failed { .. } => write!(f, "the last extraction failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Input capture and result state for one user session.
#[derive(Debug, Clone)]
pub struct Session {
    text: String,
    staged_file: Option<StagedFile>,
    phase: Phase,
    notice: Option<String>,
    progress: ProgressLog,
    next_ticket: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            staged_file: None,
            phase: Phase::Idle,
            notice: None,
            progress: ProgressLog::cleared(),
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.staged_file.as_ref()
    }

    /// Inline message shown next to the form (missing input).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => self.notice(),
        }
    }

    pub fn progress(&self) -> &ProgressLog {
        &self.progress
    }

    pub(crate) fn progress_mut(&mut self) -> &mut ProgressLog {
        &mut self.progress
    }

    pub fn roster(&self) -> Option<&RosterDocument> {
        match &self.phase {
            Phase::Success { roster, .. } => Some(roster),
            _ => None,
        }
    }

    pub fn view(&self) -> Option<ViewMode> {
        match &self.phase {
            Phase::Success { view, .. } => Some(*view),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Pending { .. })
    }

    /// The text field is disabled, not cleared, while a file is staged.
    pub fn text_input_enabled(&self) -> bool {
        self.staged_file.is_none() && self.form_editable()
    }

    pub fn can_submit(&self) -> bool {
        self.form_editable()
    }

    fn form_editable(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failed { .. })
    }

    fn ensure_editable(&self, operation: &str) -> Result<()> {
        match &self.phase {
            Phase::Idle | Phase::Failed { .. } => Ok(()),
            Phase::Pending { .. } => Err(RosterError::ExtractionPending),
            other => Err(RosterError::invalid_state(operation, other)),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_editable("edit text")?;
        if self.staged_file.is_some() {
            return Err(RosterError::InputLocked);
        }
        self.text = text.into();
        Ok(())
    }

    pub fn append_text(&mut self, line: &str) -> Result<()> {
        self.ensure_editable("edit text")?;
        if self.staged_file.is_some() {
            return Err(RosterError::InputLocked);
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
        Ok(())
    }

    /// Stages a document, replacing any previous one and clearing the text.
    pub fn stage_file(&mut self, file: StagedFile) -> Result<()> {
        self.ensure_editable("stage a file")?;
        if let Some(previous) = &self.staged_file {
            tracing::debug!("Replacing staged file '{}' with '{}'", previous.name, file.name);
        }
        tracing::info!("Staged '{}' ({})", file.name, file.mime_type);
        self.text.clear();
        self.staged_file = Some(file);
        Ok(())
    }

    /// Moves to `Pending` and hands out the request to send.
    ///
    /// Missing input never leaves the form: the notice is set and no ticket is
    /// issued, so no network call can happen.
    pub fn begin(&mut self) -> Result<(Ticket, ExtractionRequest)> {
        self.ensure_editable("submit")?;

        let request = ExtractionRequest::new(self.staged_file.as_ref(), Some(&self.text));
        if request.is_empty() {
            self.notice = Some(MISSING_INPUT_MESSAGE.to_string());
            return Err(RosterError::MissingInput);
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.notice = None;
        self.progress = ProgressLog::new();
        self.phase = Phase::Pending { ticket };
        tracing::debug!("Extraction {:?} started", ticket);
        Ok((ticket, request))
    }

    /// Applies the outcome of the extraction identified by `ticket`. Outcomes
    /// arriving after a reset, or for an older ticket, are dropped.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<RosterDocument>) -> Completion {
        match self.phase {
            Phase::Pending { ticket: current } if current == ticket => {}
            _ => {
                tracing::debug!("Discarding stale extraction result for {:?}", ticket);
                return Completion::Stale;
            }
        }

        match outcome {
            Ok(roster) => {
                let gaps = roster.missing_weeks();
                if !gaps.is_empty() {
                    tracing::warn!("Roster has gaps in week numbering: {:?}", gaps);
                }
                tracing::info!(
                    "Extracted {} weeks for series '{}'",
                    roster.weeks.len(),
                    roster.series_label
                );
                self.phase = Phase::Success {
                    roster,
                    view: ViewMode::Calendar,
                };
            }
            Err(e) => {
                tracing::error!("Extraction failed: {} (category: {:?})", e, e.category());
                let message = e.user_friendly_message();
                self.progress.record_failure(&message);
                self.phase = Phase::Failed { message };
            }
        }
        Completion::Applied
    }

    pub fn set_view(&mut self, mode: ViewMode) -> Result<()> {
        match &mut self.phase {
            Phase::Success { view, .. } => {
                *view = mode;
                Ok(())
            }
            other => Err(RosterError::invalid_state("switch view", &*other)),
        }
    }

    /// Back to an empty form. Any in-flight extraction becomes stale.
    pub fn reset(&mut self) {
        if self.is_pending() {
            tracing::info!(
                "Session reset while an extraction was pending; its result will be ignored"
            );
        }
        self.text.clear();
        self.staged_file = None;
        self.phase = Phase::Idle;
        self.notice = None;
        self.progress = ProgressLog::cleared();
    }
}
