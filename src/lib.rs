//! # pdf2pptx-client
//!
//! Client for a remote PDF-to-PowerPoint conversion service.
//!
//! The conversion itself (layout analysis, text and vector extraction,
//! slide generation) happens in an external backend. This crate handles
//! everything on the user's side of the wire: accepting a file, checking it
//! is a PDF, uploading it as multipart, resolving the returned download
//! link, and optionally fetching the finished deck.
//!
//! ## Flow Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Widget       drop (media-type check) or pick (.pdf filter)
//!  ├─ 2. Coordinator  busy = true, previous result cleared
//!  ├─ 3. Service      POST {serviceBaseUrl}/convert  (multipart "file")
//!  ├─ 4. Resolve      {"download_url": "/…"} → {serviceBaseUrl}/…
//!  └─ 5. Download     optional GET into a local .pptx (atomic write)
//! ```
//!
//! Failures never panic and never block: they land in a [`NoticeQueue`]
//! and the flow returns to a state where the user can try again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx_client::{ClientConfig, HttpConversionService, SelectedFile, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .service_base_url("http://localhost:8000")
//!         .build()?;
//!     let service = HttpConversionService::new(&config)?;
//!     let mut session = Session::new(service, config);
//!
//!     let file = SelectedFile::from_path("deck.pdf").await?;
//!     let url = session.drop_file(file).await?;
//!     println!("Download: {url}");
//!     session.download(".").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pptx` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod coordinator;
pub mod error;
pub mod file;
pub mod notice;
pub mod progress;
pub mod service;
pub mod session;
pub mod widget;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_SERVICE_BASE_URL};
pub use coordinator::{resolve_download_url, ConversionCoordinator, FlowPhase, FlowSnapshot};
pub use error::{ConvertError, SelectionError};
pub use file::{MediaType, SelectedFile};
pub use notice::{Notice, NoticeLevel, NoticeQueue};
pub use progress::{FlowObserver, NoopObserver, ObserverHandle, SelectionCallback};
pub use service::{ConversionService, ConvertResponse, HttpConversionService};
pub use session::Session;
pub use widget::{UploadWidget, WidgetState, INVALID_FILE_NOTICE};
