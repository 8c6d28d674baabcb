use crate::core::progress::{ProgressLog, ProgressObserver};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

fn status_line(log: &ProgressLog) -> String {
    format!(
        "{} ({}s, {}%)",
        log.current_phrase(),
        log.elapsed_secs(),
        log.percent()
    )
}

/// Spinner with the scrolling log printed above it.
#[derive(Default)]
pub struct SpinnerProgress {
    bar: Option<ProgressBar>,
    printed: usize,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush_lines(&mut self, log: &ProgressLog) {
        if let Some(bar) = &self.bar {
            for line in &log.lines()[self.printed.min(log.lines().len())..] {
                bar.println(line);
            }
        }
        self.printed = log.lines().len();
    }
}

impl ProgressObserver for SpinnerProgress {
    fn started(&mut self, log: &ProgressLog) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(status_line(log));
        self.bar = Some(bar);
        self.printed = 0;
        self.flush_lines(log);
    }

    fn step(&mut self, log: &ProgressLog) {
        self.flush_lines(log);
        if let Some(bar) = &self.bar {
            bar.set_message(status_line(log));
        }
    }

    fn tick(&mut self, log: &ProgressLog) {
        if let Some(bar) = &self.bar {
            bar.set_message(status_line(log));
        }
    }

    fn finished(&mut self, log: &ProgressLog) {
        self.flush_lines(log);
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Plain log lines, for terminals without cursor control and for pipes.
pub struct LineProgress<W: Write> {
    out: W,
    printed: usize,
}

impl<W: Write> LineProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn flush_lines(&mut self, log: &ProgressLog) {
        for line in &log.lines()[self.printed.min(log.lines().len())..] {
            // Progress output is best effort.
            let _ = writeln!(self.out, "{}", line);
        }
        self.printed = log.lines().len();
    }
}

impl<W: Write> ProgressObserver for LineProgress<W> {
    fn started(&mut self, log: &ProgressLog) {
        self.printed = 0;
        self.flush_lines(log);
    }

    fn step(&mut self, log: &ProgressLog) {
        self.flush_lines(log);
    }

    fn finished(&mut self, log: &ProgressLog) {
        self.flush_lines(log);
        let _ = writeln!(self.out, "[{}s elapsed]", log.elapsed_secs());
    }
}
