//! Client configuration for talking to the conversion service.
//!
//! All behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`] or loaded from a JSON document whose keys use the
//! camelCase names (`serviceBaseUrl`, `requestTimeoutSecs`, …).
//!
//! The service address is always configuration; nothing in the coordinator
//! or the HTTP layer embeds a host name.

use crate::error::ConvertError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Default service address, matching the reference backend's dev server.
pub const DEFAULT_SERVICE_BASE_URL: &str = "http://localhost:8000";

/// Configuration for a conversion client.
///
/// # Example
/// ```rust
/// use pdf2pptx_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .service_base_url("http://converter.internal:8000")
///     .request_timeout_secs(300)
///     .build()
///     .unwrap();
/// assert_eq!(
///     config.convert_url().unwrap().as_str(),
///     "http://converter.internal:8000/convert"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base address of the conversion service. Default: `http://localhost:8000`.
    ///
    /// Used as the prefix for the upload target and for relative artifact
    /// paths in the reply. A trailing slash is ignored; a path prefix
    /// (`https://host/api`) is kept.
    pub service_base_url: String,

    /// Path of the upload endpoint, appended to the base. Default: `/convert`.
    pub convert_path: String,

    /// Name of the multipart field carrying the PDF. Default: `file`.
    pub file_field: String,

    /// Optional whole-request timeout for the upload, in seconds. Default: none.
    ///
    /// Conversions of long decks can take minutes, so no timeout is applied
    /// unless one is configured. Failures are otherwise detected only from
    /// the HTTP response or a connection error.
    pub request_timeout_secs: Option<u64>,

    /// Timeout for fetching the converted artifact, in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Maximum number of undismissed notices kept. Default: 32.
    pub notice_capacity: usize,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            service_base_url: DEFAULT_SERVICE_BASE_URL.to_string(),
            convert_path: "/convert".to_string(),
            file_field: "file".to_string(),
            request_timeout_secs: None,
            download_timeout_secs: 120,
            notice_capacity: 32,
            user_agent: concat!("pdf2pptx-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Parse a JSON configuration document and validate it.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConvertError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConvertError::InvalidConfig(format!("config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The service base address with any trailing slash removed.
    pub fn base(&self) -> &str {
        self.service_base_url.trim_end_matches('/')
    }

    /// The parsed service base address.
    pub fn base_url(&self) -> Result<Url, ConvertError> {
        Url::parse(self.base()).map_err(|e| {
            ConvertError::InvalidConfig(format!(
                "serviceBaseUrl '{}' is not a valid URL: {e}",
                self.service_base_url
            ))
        })
    }

    /// Full address of the upload endpoint.
    pub fn convert_url(&self) -> Result<Url, ConvertError> {
        let path = self.convert_path.trim_start_matches('/');
        let joined = format!("{}/{}", self.base(), path);
        Url::parse(&joined).map_err(|e| {
            ConvertError::InvalidConfig(format!("convert URL '{joined}' is invalid: {e}"))
        })
    }

    /// Check every field; the builder and JSON loader both call this.
    pub fn validate(&self) -> Result<(), ConvertError> {
        let base = self.base_url()?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ConvertError::InvalidConfig(format!(
                "serviceBaseUrl must use http or https, got '{}'",
                base.scheme()
            )));
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(ConvertError::InvalidConfig(
                "serviceBaseUrl must not carry a query or fragment".into(),
            ));
        }
        if self.convert_path.trim_matches('/').is_empty() {
            return Err(ConvertError::InvalidConfig(
                "convertPath must not be empty".into(),
            ));
        }
        if self.file_field.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "fileField must not be empty".into(),
            ));
        }
        if self.notice_capacity == 0 {
            return Err(ConvertError::InvalidConfig(
                "noticeCapacity must be ≥ 1".into(),
            ));
        }
        if self.download_timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "downloadTimeoutSecs must be ≥ 1".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConvertError::InvalidConfig(
                "requestTimeoutSecs must be ≥ 1 when set".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn service_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.service_base_url = url.into();
        self
    }

    pub fn convert_path(mut self, path: impl Into<String>) -> Self {
        self.config.convert_path = path.into();
        self
    }

    pub fn file_field(mut self, field: impl Into<String>) -> Self {
        self.config.file_field = field.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn notice_capacity(mut self, n: usize) -> Self {
        self.config.notice_capacity = n.max(1);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ConvertError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
