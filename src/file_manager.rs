// src/file_manager.rs - Picks up the document to stage
use std::path::Path;
use thiserror::Error;
use tokio::fs;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum FileManagerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("'{0}' is not a PDF file")]
    NotPdf(String),
    #[error("Invalid file name: {0}")]
    InvalidName(String),
}

/// The single document held by the form until it is submitted, removed or
/// replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content,
        }
    }

    /// Shorthand for a file already known to be a PDF.
    pub fn pdf(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self::new(name, PDF_MEDIA_TYPE, content)
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Loads documents from disk, accepting only PDFs.
#[derive(Debug, Clone, Default)]
pub struct FileManager;

impl FileManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a file and stage it as `application/pdf`.
    ///
    /// The file needs a `.pdf` extension and must start with the `%PDF-`
    /// header; anything else is refused before it ever reaches the form.
    pub async fn load_pdf(&self, path: impl AsRef<Path>) -> Result<StagedFile, FileManagerError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FileManagerError::InvalidName(path.display().to_string()))?
            .to_string();

        if !has_pdf_extension(&name) {
            return Err(FileManagerError::NotPdf(name));
        }

        tracing::info!("Reading document: {}", path.display());
        let content = fs::read(path).await?;
        if !content.starts_with(PDF_MAGIC) {
            tracing::warn!("{} has a .pdf extension but no PDF header", name);
            return Err(FileManagerError::NotPdf(name));
        }

        tracing::debug!("Loaded {} ({} bytes)", name, content.len());
        Ok(StagedFile::pdf(name, content))
    }
}

fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
