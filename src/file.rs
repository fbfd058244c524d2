//! The candidate file handed to the upload widget.
//!
//! A [`SelectedFile`] is an in-memory blob plus the metadata a browser
//! attaches to a dropped or picked file: name, size and a *declared* media
//! type. The declared type is a guess from the extension, not a content
//! sniff, so a text file renamed to `.pdf` still declares `application/pdf`. The widget's
//! check runs against this declared value only.

use crate::error::ConvertError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A declared media (MIME) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MediaType(String);

impl MediaType {
    /// The only media type the upload widget accepts.
    pub const PDF: &'static str = "application/pdf";

    /// Fallback for unknown extensions.
    pub const OCTET_STREAM: &'static str = "application/octet-stream";

    /// Wrap a media type string, normalised to lowercase without parameters.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let essence = raw.as_ref().split(';').next().unwrap_or_default();
        Self(essence.trim().to_ascii_lowercase())
    }

    pub fn pdf() -> Self {
        Self(Self::PDF.to_string())
    }

    /// Guess the declared type from a file name's extension.
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let guessed = match ext.as_deref() {
            Some("pdf") => Self::PDF,
            Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            Some("ppt") => "application/vnd.ms-powerpoint",
            Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            Some("html") | Some("htm") => "text/html",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("json") => "application/json",
            _ => Self::OCTET_STREAM,
        };
        Self(guessed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_pdf(&self) -> bool {
        self.0 == Self::PDF
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file chosen by the user, held entirely in memory.
///
/// Cloning is cheap; the bytes are shared.
#[derive(Clone)]
pub struct SelectedFile {
    name: String,
    media_type: MediaType,
    bytes: Arc<[u8]>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl SelectedFile {
    /// Build a file from raw parts.
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes: bytes.into(),
        }
    }

    /// Read a local file, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let media_type = path
            .file_name()
            .map(|n| MediaType::from_file_name(&n.to_string_lossy()))
            .unwrap_or_else(|| MediaType::new(MediaType::OCTET_STREAM));
        Self::from_path_as(path, media_type).await
    }

    /// Read a local file with an explicitly declared media type.
    pub async fn from_path_as(
        path: impl AsRef<Path>,
        media_type: MediaType,
    ) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let bytes = read_local(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        debug!(
            "Read {} ({} bytes, declared {})",
            path.display(),
            bytes.len(),
            media_type
        );
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the name passes an extension filter like `.pdf`.
    pub fn has_extension(&self, ext: &str) -> bool {
        let wanted = ext.trim_start_matches('.');
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
    }

    /// Size in megabytes with two decimals, e.g. `"1.23 MB"`.
    pub fn describe_size(&self) -> String {
        format!("{:.2} MB", self.bytes.len() as f64 / 1024.0 / 1024.0)
    }

    /// Default output file name for the converted deck.
    pub fn pptx_name(&self) -> String {
        pptx_name_for(&self.name)
    }
}

/// `slides.pdf` → `slides.pptx`; names without a stem become `presentation.pptx`.
pub fn pptx_name_for(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "presentation".to_string());
    format!("{stem}.pptx")
}

async fn read_local(path: &Path) -> Result<Vec<u8>, ConvertError> {
    let owned: PathBuf = path.to_path_buf();
    match tokio::fs::read(&owned).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConvertError::FileNotFound { path: owned })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(ConvertError::PermissionDenied { path: owned })
        }
        Err(e) => Err(ConvertError::ReadFailed {
            path: owned,
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_normalises() {
        assert!(MediaType::new("Application/PDF").is_pdf());
        assert!(MediaType::new("application/pdf; charset=binary").is_pdf());
        assert!(!MediaType::new("application/x-pdf").is_pdf());
    }

    #[test]
    fn media_type_from_extension() {
        assert!(MediaType::from_file_name("deck.PDF").is_pdf());
        assert_eq!(MediaType::from_file_name("notes.txt").as_str(), "text/plain");
        assert_eq!(
            MediaType::from_file_name("no_extension").as_str(),
            MediaType::OCTET_STREAM
        );
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let f = SelectedFile::new("Report.Pdf", MediaType::pdf(), vec![]);
        assert!(f.has_extension(".pdf"));
        assert!(f.has_extension("pdf"));
        assert!(!f.has_extension(".pptx"));
    }

    #[test]
    fn describe_size_in_megabytes() {
        let f = SelectedFile::new("a.pdf", MediaType::pdf(), vec![0u8; 1024 * 1024 + 512 * 1024]);
        assert_eq!(f.describe_size(), "1.50 MB");
    }

    #[test]
    fn pptx_name_swaps_extension() {
        let f = SelectedFile::new("slides.v2.pdf", MediaType::pdf(), vec![]);
        assert_eq!(f.pptx_name(), "slides.v2.pptx");
    }

    #[tokio::test]
    async fn from_path_reads_and_declares() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("deck.pdf");
        std::fs::write(&p, b"%PDF-1.7 body").unwrap();

        let f = SelectedFile::from_path(&p).await.unwrap();
        assert_eq!(f.name(), "deck.pdf");
        assert!(f.media_type().is_pdf());
        assert_eq!(f.size(), 13);
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = SelectedFile::from_path("/definitely/not/here.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }
}
