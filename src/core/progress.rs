//! Cosmetic progress shown while an extraction is pending.
//!
//! Nothing here reflects real request progress: the call to the extraction
//! service is a single request with no intermediate signal. The log is a pure
//! function of how many step ticks and second ticks have fired.

use std::time::Duration;

pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(2000);

/// Shorter step intervals are raised to this.
pub const MIN_STEP_INTERVAL: Duration = Duration::from_millis(1);

pub const HANDSHAKE_LINE: &str = "> [SYS] Opening session with the extraction service...";

pub const PROGRESS_STEPS: [&str; 12] = [
    "Initialising roster extraction protocol...",
    "Uploading roster document...",
    "Locating the roster grid...",
    "Reading the series header...",
    "Identifying the roster period...",
    "Extracting every duty day of the cycle...",
    "Checking minutes on start and end times...",
    "Converting night shifts past 24:00...",
    "Filtering rest codes (HSBR / RT / CW)...",
    "Checking week numbering...",
    "Assembling the roster JSON...",
    "Ready for departure...",
];

pub fn step_line(index: usize) -> String {
    format!("> [STEP] {}", PROGRESS_STEPS[index % PROGRESS_STEPS.len()])
}

pub fn failure_line(message: &str) -> String {
    format!("! [FAIL] {}", message)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLog {
    step_index: usize,
    elapsed_secs: u64,
    lines: Vec<String>,
}

impl Default for ProgressLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressLog {
    pub fn new() -> Self {
        Self {
            step_index: 0,
            elapsed_secs: 0,
            lines: vec![HANDSHAKE_LINE.to_string()],
        }
    }

    /// An empty log, as shown before anything was submitted.
    pub fn cleared() -> Self {
        Self {
            step_index: 0,
            elapsed_secs: 0,
            lines: Vec::new(),
        }
    }

    /// The log the timers would have produced after `elapsed`.
    /// `step_interval` is raised to [`MIN_STEP_INTERVAL`] like the engine does.
    pub fn projected(elapsed: Duration, step_interval: Duration) -> Self {
        let mut log = Self::new();
        let steps = elapsed.as_nanos() / step_interval.max(MIN_STEP_INTERVAL).as_nanos();
        for _ in 0..steps {
            log.advance_step();
        }
        log.elapsed_secs = elapsed.as_secs();
        log
    }

    pub fn advance_step(&mut self) -> &str {
        self.step_index = (self.step_index + 1) % PROGRESS_STEPS.len();
        self.lines.push(step_line(self.step_index));
        self.lines.last().map(String::as_str).unwrap_or_default()
    }

    pub fn tick_second(&mut self) -> u64 {
        self.elapsed_secs += 1;
        self.elapsed_secs
    }

    pub fn record_failure(&mut self, message: &str) {
        self.lines.push(failure_line(message));
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn current_phrase(&self) -> &'static str {
        PROGRESS_STEPS[self.step_index]
    }

    pub fn percent(&self) -> u8 {
        let pct = (self.step_index + 1) * 100 / PROGRESS_STEPS.len();
        pct.min(99) as u8
    }
}

/// Receives the progress log while an extraction is pending.
pub trait ProgressObserver {
    fn started(&mut self, _log: &ProgressLog) {}
    fn step(&mut self, _log: &ProgressLog) {}
    fn tick(&mut self, _log: &ProgressLog) {}
    fn finished(&mut self, _log: &ProgressLog) {}
}

/// Observer that shows nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressObserver for Silent {}
