//! Error types for the pdf2pptx-client library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SelectionError`] — **Local**: the upload widget refused a file
//!   (wrong media type, excluded by the picker filter, or the widget is
//!   busy). Nothing touched the network and the previous selection is
//!   unchanged.
//!
//! * [`ConvertError`] — **Per-attempt**: one upload/convert/download cycle
//!   failed (file unreadable, transport error, non-2xx reply, malformed
//!   body). The coordinator returns to a pre-upload state and the user may
//!   simply try again; no variant is fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

/// Why the upload widget refused a candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Dropped file did not declare `application/pdf`.
    #[error("'{name}' is not a PDF (declared type: {found})")]
    WrongMediaType { name: String, found: String },

    /// Picked file did not match the picker's extension filter.
    #[error("'{name}' does not match the accepted file types (.pdf)")]
    FilteredByPicker { name: String },

    /// An upload is in progress; the widget ignores input until it ends.
    #[error("An upload is in progress; selection ignored")]
    Busy,
}

/// Errors returned by a single conversion attempt.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists but reading it failed part-way.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The widget refused the file before any upload started.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    // ── Flow errors ───────────────────────────────────────────────────────
    /// A conversion is already in flight on this coordinator.
    #[error("A conversion is already in progress; wait for it to finish")]
    Busy,

    /// `download` was called before any conversion succeeded.
    #[error("No converted file is available yet")]
    NoResult,

    // ── Service errors ────────────────────────────────────────────────────
    /// The request never produced an HTTP response.
    #[error("Could not reach the conversion service at '{url}': {reason}")]
    Transport { url: String, reason: String },

    /// A configured request timeout elapsed.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The service answered with a non-2xx status.
    #[error("Conversion failed: service returned HTTP {status}")]
    ServerRejected { status: u16, body: String },

    /// The 2xx body was not the expected JSON document.
    #[error("Conversion service sent an unexpected reply: {reason}")]
    MalformedResponse { reason: String },

    /// The artifact location could not be turned into a URL.
    #[error("Invalid download location '{location}': {reason}")]
    InvalidArtifactUrl { location: String, reason: String },

    /// Fetching the converted file failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the downloaded file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConvertError {
    /// Short message suitable for a user-facing notice.
    ///
    /// Multi-line hints in the `Display` output are trimmed to the first line.
    pub fn notice_text(&self) -> String {
        let full = self.to_string();
        full.lines().next().unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_media_type_display() {
        let e = SelectionError::WrongMediaType {
            name: "notes.txt".into(),
            found: "text/plain".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"), "got: {msg}");
        assert!(msg.contains("text/plain"), "got: {msg}");
    }

    #[test]
    fn server_rejected_display() {
        let e = ConvertError::ServerRejected {
            status: 500,
            body: "boom".into(),
        };
        assert!(e.to_string().contains("HTTP 500"));
    }

    #[test]
    fn selection_error_converts() {
        let e: ConvertError = SelectionError::Busy.into();
        assert!(matches!(e, ConvertError::Selection(SelectionError::Busy)));
        assert!(e.to_string().contains("in progress"));
    }

    #[test]
    fn notice_text_drops_hint_lines() {
        let e = ConvertError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        let text = e.notice_text();
        assert!(text.contains("missing.pdf"));
        assert!(!text.contains('\n'));
        assert!(!text.contains("Check the path"));
    }
}
