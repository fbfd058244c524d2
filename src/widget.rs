//! The upload widget: file acceptance and busy presentation.
//!
//! The widget holds at most one selected file and one of three mutually
//! exclusive states. It never uploads anything; accepted files are handed
//! to the [`SelectionCallback`] and returned to the caller, which decides
//! what to do next.
//!
//! ```text
//!   Idle ──valid file──▶ FileChosen
//!    │                      │
//!    └──set_busy(true)──┐   └──set_busy(true)──┐
//!                       ▼                      ▼
//!                      Busy ──set_busy(false)──▶ FileChosen (or Idle)
//! ```

use crate::error::SelectionError;
use crate::file::SelectedFile;
use crate::notice::NoticeQueue;
use crate::progress::{NoopObserver, SelectionCallback};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Message shown when a file is refused for its type.
pub const INVALID_FILE_NOTICE: &str = "Please upload a PDF file.";

/// Extension filter applied by the file picker.
pub const PICKER_EXTENSION: &str = ".pdf";

/// Visual state of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetState {
    Idle,
    FileChosen,
    Busy,
}

/// Accepts exactly one candidate file via drop or pick.
pub struct UploadWidget {
    selected: Option<SelectedFile>,
    busy: bool,
    on_select: Arc<dyn SelectionCallback>,
    notices: NoticeQueue,
}

impl UploadWidget {
    pub fn new(notices: NoticeQueue) -> Self {
        Self {
            selected: None,
            busy: false,
            on_select: Arc::new(NoopObserver),
            notices,
        }
    }

    /// Install the callback fired for every accepted file.
    pub fn with_callback(mut self, cb: Arc<dyn SelectionCallback>) -> Self {
        self.on_select = cb;
        self
    }

    pub fn state(&self) -> WidgetState {
        if self.busy {
            WidgetState::Busy
        } else if self.selected.is_some() {
            WidgetState::FileChosen
        } else {
            WidgetState::Idle
        }
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Drop path: the declared media type must be `application/pdf`.
    pub fn accept_drop(&mut self, file: SelectedFile) -> Result<&SelectedFile, SelectionError> {
        if self.busy {
            debug!("Ignoring drop of '{}' while busy", file.name());
            return Err(SelectionError::Busy);
        }
        if !file.media_type().is_pdf() {
            warn!(
                "Rejected dropped file '{}' with type {}",
                file.name(),
                file.media_type()
            );
            self.notices.warning(INVALID_FILE_NOTICE);
            return Err(SelectionError::WrongMediaType {
                name: file.name().to_string(),
                found: file.media_type().to_string(),
            });
        }
        Ok(self.record(file))
    }

    /// Pick path: only the picker's extension filter applies.
    pub fn accept_pick(&mut self, file: SelectedFile) -> Result<&SelectedFile, SelectionError> {
        if self.busy {
            debug!("Ignoring pick of '{}' while busy", file.name());
            return Err(SelectionError::Busy);
        }
        if !file.has_extension(PICKER_EXTENSION) {
            warn!("Picker filter excluded '{}'", file.name());
            self.notices.warning(INVALID_FILE_NOTICE);
            return Err(SelectionError::FilteredByPicker {
                name: file.name().to_string(),
            });
        }
        Ok(self.record(file))
    }

    /// Told by the coordinator that an upload started or ended.
    pub fn set_busy(&mut self, busy: bool) {
        if self.busy != busy {
            debug!("Widget busy: {} → {}", self.busy, busy);
        }
        self.busy = busy;
    }

    fn record(&mut self, file: SelectedFile) -> &SelectedFile {
        debug!("Selected '{}' ({})", file.name(), file.describe_size());
        let file = self.selected.insert(file);
        self.on_select.on_file_selected(file);
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MediaType;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        names: Mutex<Vec<String>>,
    }

    impl SelectionCallback for Recorder {
        fn on_file_selected(&self, file: &SelectedFile) {
            self.names.lock().unwrap().push(file.name().to_string());
        }
    }

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(name, MediaType::pdf(), b"%PDF-1.4".to_vec())
    }

    fn widget() -> (UploadWidget, Arc<Recorder>, NoticeQueue) {
        let notices = NoticeQueue::default();
        let rec = Arc::new(Recorder::default());
        let w = UploadWidget::new(notices.clone()).with_callback(rec.clone());
        (w, rec, notices)
    }

    #[test]
    fn starts_idle() {
        let (w, _, _) = widget();
        assert_eq!(w.state(), WidgetState::Idle);
        assert!(w.selected().is_none());
    }

    #[test]
    fn drop_pdf_fires_callback_once() {
        let (mut w, rec, notices) = widget();
        let accepted = w.accept_drop(pdf("deck.pdf")).unwrap();
        assert_eq!(accepted.name(), "deck.pdf");
        assert_eq!(w.state(), WidgetState::FileChosen);
        assert_eq!(*rec.names.lock().unwrap(), vec!["deck.pdf"]);
        assert!(notices.is_empty());
    }

    #[test]
    fn drop_non_pdf_is_rejected_and_keeps_selection() {
        let (mut w, rec, notices) = widget();
        w.accept_drop(pdf("first.pdf")).unwrap();

        let txt = SelectedFile::new("notes.pdf", MediaType::new("text/plain"), vec![1, 2]);
        let err = w.accept_drop(txt).unwrap_err();
        assert!(matches!(err, SelectionError::WrongMediaType { .. }));

        assert_eq!(w.selected().unwrap().name(), "first.pdf");
        assert_eq!(rec.names.lock().unwrap().len(), 1);
        let pending = notices.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].message, INVALID_FILE_NOTICE);
    }

    #[test]
    fn pick_uses_extension_filter_only() {
        let (mut w, rec, _) = widget();
        // Picker does not re-check the declared type.
        let odd = SelectedFile::new("scan.PDF", MediaType::new("application/octet-stream"), vec![]);
        w.accept_pick(odd).unwrap();
        assert_eq!(rec.names.lock().unwrap().len(), 1);

        let err = w
            .accept_pick(SelectedFile::new("scan.docx", MediaType::pdf(), vec![]))
            .unwrap_err();
        assert!(matches!(err, SelectionError::FilteredByPicker { .. }));
        assert_eq!(w.selected().unwrap().name(), "scan.PDF");
    }

    #[test]
    fn busy_ignores_input() {
        let (mut w, rec, notices) = widget();
        w.set_busy(true);
        assert_eq!(w.state(), WidgetState::Busy);

        assert_eq!(w.accept_drop(pdf("a.pdf")).unwrap_err(), SelectionError::Busy);
        assert_eq!(w.accept_pick(pdf("b.pdf")).unwrap_err(), SelectionError::Busy);
        assert!(rec.names.lock().unwrap().is_empty());
        assert!(notices.is_empty());
    }

    #[test]
    fn busy_returns_to_file_chosen() {
        let (mut w, _, _) = widget();
        w.accept_drop(pdf("a.pdf")).unwrap();
        w.set_busy(true);
        assert_eq!(w.state(), WidgetState::Busy);
        w.set_busy(false);
        assert_eq!(w.state(), WidgetState::FileChosen);
    }

    #[test]
    fn busy_without_selection_returns_to_idle() {
        let (mut w, _, _) = widget();
        w.set_busy(true);
        w.set_busy(false);
        assert_eq!(w.state(), WidgetState::Idle);
    }

    #[test]
    fn new_selection_replaces_old() {
        let (mut w, rec, _) = widget();
        w.accept_drop(pdf("a.pdf")).unwrap();
        w.accept_drop(pdf("b.pdf")).unwrap();
        assert_eq!(w.selected().unwrap().name(), "b.pdf");
        assert_eq!(*rec.names.lock().unwrap(), vec!["a.pdf", "b.pdf"]);
    }
}
