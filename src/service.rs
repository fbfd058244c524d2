//! The network seam: upload a PDF, fetch the converted deck.
//!
//! [`ConversionService`] is the only place the coordinator touches the
//! network. [`HttpConversionService`] implements it with `reqwest`; tests
//! swap in a scripted double so flow logic can be exercised without a
//! server.
//!
//! ## Wire format
//!
//! ```text
//! POST {base}/convert            multipart/form-data; part "file" = PDF bytes
//! 200  {"message": "...", "download_url": "/download-result/deck.pptx"}
//! GET  {resolved download_url}   → the .pptx bytes
//! ```
//!
//! Any non-2xx reply is a failure; the status is recorded for the error
//! message but never branched on. A download answered with JSON or text
//! is a failure too, whatever its status.

use crate::config::ClientConfig;
use crate::error::ConvertError;
use crate::file::SelectedFile;
use crate::progress::FlowObserver;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Longest error body kept in [`ConvertError::ServerRejected`].
const MAX_ERROR_BODY: usize = 512;

/// The JSON reply to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertResponse {
    /// Relative path or absolute URL of the generated artifact.
    #[serde(alias = "downloadUrl")]
    pub download_url: String,

    /// Free-form status text from the service.
    #[serde(default)]
    pub message: Option<String>,
}

/// Talks to an external PDF-to-PPTX conversion service.
pub trait ConversionService: Send + Sync {
    /// Upload one PDF and return the service's reply.
    fn convert(
        &self,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<ConvertResponse, ConvertError>> + Send;

    /// Stream the artifact at `url` into `dest`, returning the byte count.
    fn fetch_artifact(
        &self,
        url: &Url,
        dest: &Path,
        observer: &dyn FlowObserver,
    ) -> impl Future<Output = Result<u64, ConvertError>> + Send;
}

/// `reqwest`-backed [`ConversionService`].
#[derive(Debug, Clone)]
pub struct HttpConversionService {
    client: reqwest::Client,
    convert_url: Url,
    file_field: String,
    request_timeout_secs: Option<u64>,
    download_timeout_secs: u64,
}

impl HttpConversionService {
    pub fn new(config: &ClientConfig) -> Result<Self, ConvertError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConvertError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            convert_url: config.convert_url()?,
            file_field: config.file_field.clone(),
            request_timeout_secs: config.request_timeout_secs,
            download_timeout_secs: config.download_timeout_secs,
        })
    }

    pub fn convert_url(&self) -> &Url {
        &self.convert_url
    }
}

impl ConversionService for HttpConversionService {
    async fn convert(&self, file: &SelectedFile) -> Result<ConvertResponse, ConvertError> {
        let url = self.convert_url.clone();
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.media_type().as_str())
            .map_err(|e| ConvertError::Internal(format!("multipart part: {e}")))?;
        let form = Form::new().part(self.file_field.clone(), part);

        let mut request = self.client.post(url.clone()).multipart(form);
        if let Some(secs) = self.request_timeout_secs {
            request = request.timeout(Duration::from_secs(secs));
        }

        debug!("POST {} ({} bytes as '{}')", url, file.size(), self.file_field);
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, &url, self.request_timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::ServerRejected {
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, &url, self.request_timeout_secs))?;
        let reply = parse_convert_response(&body)?;
        if let Some(ref msg) = reply.message {
            debug!("Service says: {}", msg);
        }
        Ok(reply)
    }

    async fn fetch_artifact(
        &self,
        url: &Url,
        dest: &Path,
        observer: &dyn FlowObserver,
    ) -> Result<u64, ConvertError> {
        info!("Downloading {} → {}", url, dest.display());

        let response = self
            .client
            .get(url.clone())
            .timeout(Duration::from_secs(self.download_timeout_secs))
            .send()
            .await
            .map_err(|e| download_error(url, e))?;

        if !response.status().is_success() {
            return Err(ConvertError::DownloadFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        // The reference backend answers a missing file with 200 and a JSON
        // error body; a deck is never served as JSON or text.
        if let Some(kind) = textual_content_type(&response) {
            let body = response.text().await.unwrap_or_default();
            return Err(ConvertError::DownloadFailed {
                url: url.to_string(),
                reason: error_reply_reason(&kind, &body),
            });
        }
        let total = response.content_length();

        // Atomic write: temp file in the destination directory, then rename.
        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let write_err = |source: std::io::Error| ConvertError::OutputWriteFailed {
            path: dest.to_path_buf(),
            source,
        };
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        let (std_file, tmp_path) = tempfile::NamedTempFile::new_in(parent)
            .map_err(write_err)?
            .into_parts();
        let mut out = tokio::fs::File::from_std(std_file);

        let mut downloaded = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| download_error(url, e))?;
            out.write_all(&chunk).await.map_err(write_err)?;
            downloaded += chunk.len() as u64;
            observer.on_download_progress(downloaded, total);
        }
        out.flush().await.map_err(write_err)?;
        drop(out);

        tmp_path
            .persist(dest)
            .map_err(|e| write_err(e.error))?;

        debug!("Wrote {} bytes to {}", downloaded, dest.display());
        Ok(downloaded)
    }
}

/// Parse the upload reply body.
pub fn parse_convert_response(body: &[u8]) -> Result<ConvertResponse, ConvertError> {
    let reply: ConvertResponse =
        serde_json::from_slice(body).map_err(|e| ConvertError::MalformedResponse {
            reason: e.to_string(),
        })?;
    if reply.download_url.trim().is_empty() {
        return Err(ConvertError::MalformedResponse {
            reason: "download_url is empty".into(),
        });
    }
    Ok(reply)
}

/// File name carried by an artifact URL, if its last segment has an extension.
///
/// The segment is percent-decoded; names that would escape the target
/// directory are refused.
pub fn artifact_file_name(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let name = percent_encoding::percent_decode_str(last)
        .decode_utf8()
        .ok()?;
    if name.is_empty()
        || !name.contains('.')
        || name.contains(['/', '\\', '\0'])
        || name == "."
        || name == ".."
    {
        return None;
    }
    Some(name.into_owned())
}

/// `Some(content type)` when the reply is JSON or text rather than a file.
fn textual_content_type(response: &reqwest::Response) -> Option<String> {
    let raw = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)?
        .to_str()
        .ok()?;
    let kind = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let textual = kind == "application/json" || kind.ends_with("+json") || kind.starts_with("text/");
    textual.then_some(kind)
}

/// Describe an error reply, preferring the body's `error` field.
fn error_reply_reason(content_type: &str, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
    match detail {
        Some(msg) => format!("service reported: {msg}"),
        None if body.trim().is_empty() => format!("unexpected {content_type} reply"),
        None => format!(
            "unexpected {content_type} reply: {}",
            truncate(body.trim().to_string(), 200)
        ),
    }
}

fn transport_error(e: reqwest::Error, url: &Url, timeout_secs: Option<u64>) -> ConvertError {
    if e.is_timeout() {
        ConvertError::Timeout {
            url: url.to_string(),
            secs: timeout_secs.unwrap_or_default(),
        }
    } else {
        ConvertError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn download_error(url: &Url, e: reqwest::Error) -> ConvertError {
    ConvertError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}
