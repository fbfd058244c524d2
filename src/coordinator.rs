//! The conversion coordinator: one upload → convert → download cycle at a time.
//!
//! ## Flow
//!
//! ```text
//!  Idle ──submit──▶ Uploading ──2xx + download_url──▶ Completed
//!                       │
//!                       └──transport / non-2xx / bad body──▶ Failed
//! ```
//!
//! `submit` clears any previous result before the request leaves, so a
//! result is never visible while an upload is in flight and never survives
//! a failed attempt. Every outcome is reported through the shared
//! [`NoticeQueue`] and the optional
//! [`FlowObserver`](crate::progress::FlowObserver).
//!
//! ## Concurrent submissions
//!
//! A second `submit` while one is in flight is **rejected** with
//! [`ConvertError::Busy`]; the running attempt is not disturbed. State sits
//! behind a `std::sync::Mutex` held only for short sections and never
//! across an `.await`, so the coordinator can be shared through an `Arc`.

use crate::config::ClientConfig;
use crate::error::ConvertError;
use crate::file::{pptx_name_for, SelectedFile};
use crate::notice::NoticeQueue;
use crate::progress::{NoopObserver, ObserverHandle};
use crate::service::{artifact_file_name, ConversionService};
use reqwest::Url;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowPhase {
    #[default]
    Idle,
    Uploading,
    Completed,
    Failed,
}

/// Point-in-time copy of the coordinator state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub busy: bool,
    pub file_name: Option<String>,
    pub download_url: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct FlowState {
    phase: FlowPhase,
    file_name: Option<String>,
    download_url: Option<Url>,
    last_error: Option<String>,
}

/// Owns the flow state and the exchange with the conversion service.
pub struct ConversionCoordinator<S> {
    service: S,
    config: ClientConfig,
    state: Mutex<FlowState>,
    notices: NoticeQueue,
    observer: ObserverHandle,
}

impl<S: ConversionService> ConversionCoordinator<S> {
    pub fn new(service: S, config: ClientConfig, notices: NoticeQueue) -> Self {
        Self {
            service,
            config,
            state: Mutex::new(FlowState::default()),
            notices,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observer = observer;
        self
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn is_busy(&self) -> bool {
        self.lock().phase == FlowPhase::Uploading
    }

    pub fn phase(&self) -> FlowPhase {
        self.lock().phase
    }

    /// The resolved artifact address, once a conversion succeeded.
    pub fn download_url(&self) -> Option<Url> {
        self.lock().download_url.clone()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        let state = self.lock();
        FlowSnapshot {
            phase: state.phase,
            busy: state.phase == FlowPhase::Uploading,
            file_name: state.file_name.clone(),
            download_url: state.download_url.as_ref().map(Url::to_string),
            last_error: state.last_error.clone(),
        }
    }

    /// Hide a displayed result, e.g. because a new file was chosen.
    ///
    /// No-op while an upload is in flight.
    pub fn clear_result(&self) {
        let mut state = self.lock();
        if state.phase == FlowPhase::Uploading {
            return;
        }
        if state.download_url.take().is_some() {
            debug!("Cleared previous conversion result");
        }
        state.phase = FlowPhase::Idle;
        state.last_error = None;
    }

    /// Upload `file` and resolve the converted artifact's address.
    ///
    /// # Errors
    /// - [`ConvertError::Busy`] if another submission is in flight
    /// - any transport, status or reply error from the service
    /// - [`ConvertError::InvalidArtifactUrl`] if the reply cannot be resolved
    pub async fn submit(&self, file: &SelectedFile) -> Result<Url, ConvertError> {
        {
            let mut state = self.lock();
            if state.phase == FlowPhase::Uploading {
                drop(state);
                warn!("Rejected '{}': a conversion is already running", file.name());
                self.notices
                    .warning("A conversion is already in progress. Wait for it to finish.");
                return Err(ConvertError::Busy);
            }
            state.phase = FlowPhase::Uploading;
            state.file_name = Some(file.name().to_string());
            state.download_url = None;
            state.last_error = None;
        }

        info!(
            "Uploading '{}' ({}) to {}",
            file.name(),
            file.describe_size(),
            self.config.base()
        );
        self.observer.on_upload_start(file.name(), file.size());
        let started = Instant::now();

        let outcome = match self.service.convert(file).await {
            Ok(reply) => resolve_download_url(&self.config, &reply.download_url),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(url) => {
                {
                    let mut state = self.lock();
                    state.phase = FlowPhase::Completed;
                    state.download_url = Some(url.clone());
                }
                info!(
                    "Converted '{}' in {}ms → {}",
                    file.name(),
                    started.elapsed().as_millis(),
                    url
                );
                self.notices
                    .success(format!("'{}' is ready: {}", file.name(), url));
                self.observer.on_conversion_complete(&url);
                Ok(url)
            }
            Err(e) => {
                let msg = e.notice_text();
                {
                    let mut state = self.lock();
                    state.phase = FlowPhase::Failed;
                    state.download_url = None;
                    state.last_error = Some(msg.clone());
                }
                warn!("Conversion of '{}' failed: {}", file.name(), e);
                self.notices
                    .error(format!("An error occurred during conversion: {msg}"));
                self.observer.on_conversion_error(&msg);
                Err(e)
            }
        }
    }

    /// Save the current result to `dest`.
    ///
    /// If `dest` is an existing directory, the file name comes from the
    /// artifact URL, falling back to the uploaded file's stem + `.pptx`.
    pub async fn download(&self, dest: impl AsRef<Path>) -> Result<PathBuf, ConvertError> {
        let (url, fallback) = {
            let state = self.lock();
            if state.phase == FlowPhase::Uploading {
                return Err(ConvertError::Busy);
            }
            let url = state.download_url.clone().ok_or(ConvertError::NoResult)?;
            let fallback = state
                .file_name
                .as_deref()
                .map(pptx_name_for)
                .unwrap_or_else(|| "presentation.pptx".to_string());
            (url, fallback)
        };

        let dest = dest.as_ref();
        let is_dir = tokio::fs::metadata(dest)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        let target = if is_dir {
            dest.join(artifact_file_name(&url).unwrap_or(fallback))
        } else {
            dest.to_path_buf()
        };

        match self
            .service
            .fetch_artifact(&url, &target, self.observer.as_ref())
            .await
        {
            Ok(bytes) => {
                info!("Saved {} bytes to {}", bytes, target.display());
                self.notices
                    .success(format!("Saved {}", target.display()));
                self.observer.on_download_complete(bytes);
                Ok(target)
            }
            Err(e) => {
                warn!("Download of {} failed: {}", url, e);
                self.notices
                    .error(format!("Download failed: {}", e.notice_text()));
                Err(e)
            }
        }
    }
}

/// Turn the reply's artifact location into a full address.
///
/// Absolute `http(s)` URLs are used as-is. Anything else is treated as a
/// path under the service base: `http://host:8000` + `/files/abc.pptx`
/// → `http://host:8000/files/abc.pptx`. A path prefix on the base is kept.
pub fn resolve_download_url(config: &ClientConfig, location: &str) -> Result<Url, ConvertError> {
    let location = location.trim();
    let invalid = |reason: String| ConvertError::InvalidArtifactUrl {
        location: location.to_string(),
        reason,
    };

    if location.is_empty() {
        return Err(invalid("empty location".into()));
    }

    if let Ok(absolute) = Url::parse(location) {
        return match absolute.scheme() {
            "http" | "https" => Ok(absolute),
            other => Err(invalid(format!("unsupported scheme '{other}'"))),
        };
    }

    // Scheme-relative reference: borrow the base's scheme.
    if location.starts_with("//") {
        return config
            .base_url()?
            .join(location)
            .map_err(|e| invalid(e.to_string()));
    }

    let joined = if location.starts_with('/') {
        format!("{}{}", config.base(), location)
    } else {
        format!("{}/{}", config.base(), location)
    };
    Url::parse(&joined).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ClientConfig {
        ClientConfig::builder()
            .service_base_url(base)
            .build()
            .unwrap()
    }

    #[test]
    fn relative_path_is_prefixed_with_base() {
        let url = resolve_download_url(&config("http://host:8000"), "/files/abc.pptx").unwrap();
        assert_eq!(url.as_str(), "http://host:8000/files/abc.pptx");
    }

    #[test]
    fn base_trailing_slash_and_prefix() {
        let url = resolve_download_url(&config("http://host:8000/"), "/files/abc.pptx").unwrap();
        assert_eq!(url.as_str(), "http://host:8000/files/abc.pptx");

        let url =
            resolve_download_url(&config("https://example.com/api"), "download-result/x.pptx")
                .unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/download-result/x.pptx");
    }

    #[test]
    fn absolute_url_is_kept() {
        let url = resolve_download_url(
            &config("http://host:8000"),
            "https://cdn.example.com/decks/abc.pptx",
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/decks/abc.pptx");
    }

    #[test]
    fn scheme_relative_borrows_base_scheme() {
        let url =
            resolve_download_url(&config("https://host"), "//cdn.example.com/abc.pptx").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/abc.pptx");
    }

    #[test]
    fn rejects_empty_and_foreign_schemes() {
        let c = config("http://host:8000");
        assert!(matches!(
            resolve_download_url(&c, "   "),
            Err(ConvertError::InvalidArtifactUrl { .. })
        ));
        let err = resolve_download_url(&c, "file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn flow_phase_defaults_to_idle() {
        assert_eq!(FlowPhase::default(), FlowPhase::Idle);
    }
}
