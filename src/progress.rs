//! Callback traits for selection and conversion-flow events.
//!
//! Inject an [`Arc<dyn FlowObserver>`] into the coordinator to receive
//! events as an upload runs, and an [`Arc<dyn SelectionCallback>`] into the
//! widget to hear about accepted files. Callers forward these wherever they
//! like (a terminal spinner, a channel, a GUI event loop) without the
//! library knowing how the host presents them.
//!
//! # Example
//!
//! ```rust
//! use pdf2pptx_client::FlowObserver;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingObserver {
//!     uploads: AtomicUsize,
//! }
//!
//! impl FlowObserver for CountingObserver {
//!     fn on_upload_start(&self, file_name: &str, size: u64) {
//!         self.uploads.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("uploading {file_name} ({size} bytes)");
//!     }
//! }
//!
//! let observer: Arc<dyn FlowObserver> = Arc::new(CountingObserver {
//!     uploads: AtomicUsize::new(0),
//! });
//! observer.on_upload_start("deck.pdf", 1024);
//! ```

use crate::file::SelectedFile;
use reqwest::Url;
use std::sync::Arc;

/// Hears about files the upload widget accepted.
///
/// Fired exactly once per accepted file, never for rejected ones.
pub trait SelectionCallback: Send + Sync {
    fn on_file_selected(&self, file: &SelectedFile) {
        let _ = file;
    }
}

/// Called by the coordinator as a conversion cycle progresses.
///
/// All methods default to no-ops so implementors override only what they
/// need. Implementations must be `Send + Sync`; the coordinator may be
/// shared across tasks.
pub trait FlowObserver: Send + Sync {
    /// The upload request is about to be sent.
    fn on_upload_start(&self, file_name: &str, size: u64) {
        let _ = (file_name, size);
    }

    /// The service replied and the artifact address was resolved.
    fn on_conversion_complete(&self, download_url: &Url) {
        let _ = download_url;
    }

    /// The attempt failed; `error` is the user-facing message.
    fn on_conversion_error(&self, error: &str) {
        let _ = error;
    }

    /// A chunk of the artifact arrived. `total` is `None` without a
    /// `Content-Length`.
    fn on_download_progress(&self, downloaded: u64, total: Option<u64>) {
        let _ = (downloaded, total);
    }

    /// The artifact was written to disk.
    fn on_download_complete(&self, bytes: u64) {
        let _ = bytes;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopObserver;

impl FlowObserver for NoopObserver {}
impl SelectionCallback for NoopObserver {}

/// Convenience alias for the observer type stored by the coordinator.
pub type ObserverHandle = Arc<dyn FlowObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::MediaType;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    struct TrackingObserver {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        downloaded: AtomicU64,
    }

    impl FlowObserver for TrackingObserver {
        fn on_upload_start(&self, _file_name: &str, _size: u64) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _download_url: &Url) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_error(&self, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_download_progress(&self, downloaded: u64, _total: Option<u64>) {
            self.downloaded.store(downloaded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_upload_start("a.pdf", 1);
        obs.on_conversion_complete(&Url::parse("http://h/x.pptx").unwrap());
        obs.on_conversion_error("boom");
        obs.on_download_progress(10, None);
        obs.on_download_complete(10);
        obs.on_file_selected(&SelectedFile::new("a.pdf", MediaType::pdf(), vec![]));
    }

    #[test]
    fn tracking_observer_receives_events() {
        let tracker = TrackingObserver {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            downloaded: AtomicU64::new(0),
        };

        tracker.on_upload_start("a.pdf", 10);
        tracker.on_conversion_error("HTTP 500");
        tracker.on_upload_start("a.pdf", 10);
        tracker.on_conversion_complete(&Url::parse("http://h/a.pptx").unwrap());
        tracker.on_download_progress(4096, Some(8192));

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.downloaded.load(Ordering::SeqCst), 4096);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: ObserverHandle = Arc::new(NoopObserver);
        obs.on_upload_start("deck.pdf", 2048);
    }
}
