use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Media type from the file extension, `None` when it is not a PDF or an image.
pub fn detect_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_ascii_lowercase();

    let mime = match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Base64 payload of a data URL: everything after the first comma.
pub fn data_url_payload(data_url: &str) -> Option<&str> {
    let (header, payload) = data_url.split_once(',')?;
    if !header.starts_with("data:") || payload.is_empty() {
        return None;
    }
    Some(payload)
}

/// A document picked by the user, already converted to a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub mime_type: String,
    pub data_url: String,
}

impl StagedFile {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        let name = name.into();
        let mime_type = match detect_mime_type(&name) {
            Some(mime) => mime,
            None => {
                tracing::warn!(
                    "Unrecognised extension for '{}', sending as {}",
                    name,
                    FALLBACK_MIME_TYPE
                );
                FALLBACK_MIME_TYPE
            }
        };
        Self {
            data_url: to_data_url(mime_type, bytes),
            mime_type: mime_type.to_string(),
            name,
        }
    }

    pub fn is_supported_type(&self) -> bool {
        self.mime_type == "application/pdf" || self.mime_type.starts_with("image/")
    }
}

/// What the extraction client receives: `extract(fileData, textInput, mimeType)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub file_data: Option<String>,
    pub text_input: Option<String>,
    pub mime_type: String,
}

impl ExtractionRequest {
    pub fn new(file: Option<&StagedFile>, text: Option<&str>) -> Self {
        let text_input = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self {
            file_data: file.map(|f| f.data_url.clone()),
            text_input,
            mime_type: file
                .map(|f| f.mime_type.clone())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(None, Some(text))
    }

    pub fn is_empty(&self) -> bool {
        self.file_data.is_none() && self.text_input.is_none()
    }
}
