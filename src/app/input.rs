use crate::domain::ports::Storage;
use crate::domain::request::StagedFile;
use crate::utils::error::Result;
use crate::utils::validation::validate_path;
use std::io::Read;
use std::path::Path;

/// Reads a roster document and converts it to a data URL.
pub async fn load_document<S: Storage>(storage: &S, path: &str) -> Result<StagedFile> {
    validate_path("file", path)?;
    let bytes = storage.read_file(path).await?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let file = StagedFile::from_bytes(name, &bytes);
    tracing::debug!("Loaded {} ({} bytes, {})", path, bytes.len(), file.mime_type);
    Ok(file)
}

/// Reads roster text from a file, or from stdin when `path` is `-`.
pub async fn load_text<S: Storage>(storage: &S, path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    validate_path("text_file", path)?;
    let bytes = storage.read_file(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
