// Adapters layer: concrete implementations of the domain ports (extraction service, clipboard).

pub mod clipboard;
pub mod gemini;
pub mod schema;

pub use clipboard::{MemoryClipboard, Osc52Clipboard};
pub use gemini::{Credential, GeminiConfig, GeminiExtractor};
