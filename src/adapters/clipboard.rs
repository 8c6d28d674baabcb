use crate::domain::ports::ClipboardSink;
use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::Write;

/// Sets the system clipboard through the terminal with an OSC 52 escape.
/// Works over SSH and inside tmux when `set-clipboard` is on.
pub struct Osc52Clipboard<W: Write> {
    terminal: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(terminal: W) -> Self {
        Self { terminal }
    }

    pub fn into_inner(self) -> W {
        self.terminal
    }
}

impl Osc52Clipboard<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write> ClipboardSink for Osc52Clipboard<W> {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.terminal.write_all(osc52_sequence(text).as_bytes())?;
        self.terminal.flush()?;
        tracing::debug!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}

/// Keeps the last copied text in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_base64_payload_in_osc52_frame() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.copy_text("{\"a\":1}").unwrap();
        let written = String::from_utf8(clipboard.into_inner()).unwrap();

        let payload = written
            .strip_prefix("\x1b]52;c;")
            .and_then(|rest| rest.strip_suffix('\x07'))
            .unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"{\"a\":1}");
    }
}
