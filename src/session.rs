//! A session wires the widget, the coordinator and the notice queue together.
//!
//! This is the glue a page's root component would hold: a file accepted by
//! the widget is handed straight to the coordinator, the widget is marked
//! busy for the duration, and any previous result is hidden before the new
//! upload starts.

use crate::config::ClientConfig;
use crate::coordinator::{ConversionCoordinator, FlowSnapshot};
use crate::error::ConvertError;
use crate::file::SelectedFile;
use crate::notice::{Notice, NoticeQueue};
use crate::progress::{ObserverHandle, SelectionCallback};
use crate::service::ConversionService;
use crate::widget::{UploadWidget, WidgetState};
use reqwest::Url;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One user session: a widget, a coordinator and their shared notices.
pub struct Session<S> {
    widget: UploadWidget,
    coordinator: ConversionCoordinator<S>,
    notices: NoticeQueue,
}

impl<S: ConversionService> Session<S> {
    pub fn new(service: S, config: ClientConfig) -> Self {
        let notices = NoticeQueue::with_capacity(config.notice_capacity);
        Self {
            widget: UploadWidget::new(notices.clone()),
            coordinator: ConversionCoordinator::new(service, config, notices.clone()),
            notices,
        }
    }

    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.coordinator = self.coordinator.with_observer(observer);
        self
    }

    pub fn with_selection_callback(mut self, cb: Arc<dyn SelectionCallback>) -> Self {
        self.widget = self.widget.with_callback(cb);
        self
    }

    /// Drop a file onto the widget and, if accepted, convert it.
    pub async fn drop_file(&mut self, file: SelectedFile) -> Result<Url, ConvertError> {
        let accepted = self.widget.accept_drop(file)?.clone();
        self.run(accepted).await
    }

    /// Pick a file through the widget's picker and, if accepted, convert it.
    pub async fn pick_file(&mut self, file: SelectedFile) -> Result<Url, ConvertError> {
        let accepted = self.widget.accept_pick(file)?.clone();
        self.run(accepted).await
    }

    async fn run(&mut self, file: SelectedFile) -> Result<Url, ConvertError> {
        self.coordinator.clear_result();
        self.widget.set_busy(true);
        let result = self.coordinator.submit(&file).await;
        self.widget.set_busy(self.coordinator.is_busy());
        result
    }

    /// Save the current result; see [`ConversionCoordinator::download`].
    pub async fn download(&self, dest: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        self.coordinator.download(dest).await
    }

    pub fn widget_state(&self) -> WidgetState {
        self.widget.state()
    }

    pub fn widget(&self) -> &UploadWidget {
        &self.widget
    }

    pub fn coordinator(&self) -> &ConversionCoordinator<S> {
        &self.coordinator
    }

    pub fn download_url(&self) -> Option<Url> {
        self.coordinator.download_url()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        self.coordinator.snapshot()
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    /// Take all pending notices, oldest first.
    pub fn drain_notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }
}
