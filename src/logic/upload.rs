// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Upload gateway for pasted and dropped images.
//!
//! Contract of the endpoint: `POST` multipart with a single `file` field. Success is a 2xx
//! JSON body `{"url": ...}`; failure is a non-2xx status with `{"detail": ...}`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::SessionConfig;
use crate::models::clipboard::ImagePayload;

/// Stored image location returned by the endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadResult {
    /// Absolute `http(s)` URL or site-relative path.
    pub url: String,
}

/// Why an upload did not produce a usable image URL.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Image could not be sent: {0}")]
    Payload(String),
    #[error("Image upload failed: {0}")]
    Network(String),
    #[error("{detail}")]
    Rejected { status: u16, detail: String },
    #[error("Image upload returned an unexpected response: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Anything that can turn image bytes into a hosted URL.
///
/// Implementations block; the editor runtime calls them from worker threads.
pub trait UploadGateway: Send + Sync {
    fn upload(&self, image: &ImagePayload) -> Result<UploadResult, UploadError>;
}

/// `reqwest`-backed gateway for the admin image endpoint.
pub struct HttpUploadGateway {
    client: Client,
    endpoint: Url,
}

impl HttpUploadGateway {
    /// Build a gateway posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build upload HTTP client")?;
        Ok(Self { client, endpoint })
    }

    /// Gateway for the endpoint and timeout in `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Self::new(config.upload_url()?, config.upload_timeout())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl UploadGateway for HttpUploadGateway {
    fn upload(&self, image: &ImagePayload) -> Result<UploadResult, UploadError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name())
            .mime_str(&image.mime)
            .map_err(|err| UploadError::Payload(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(|err| UploadError::Network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|err| UploadError::Network(err.to_string()))?;

        interpret_response(status, &body)
    }
}

/// Map an endpoint response onto the upload contract.
///
/// Any non-2xx status, unparseable JSON or unusable `url` is a failure.
pub fn interpret_response(status: u16, body: &[u8]) -> Result<UploadResult, UploadError> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|b| b.detail)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Image upload failed (HTTP {status})."));
        return Err(UploadError::Rejected { status, detail });
    }

    let result: UploadResult =
        serde_json::from_slice(body).map_err(|err| UploadError::Malformed(err.to_string()))?;
    if !is_usable_image_url(&result.url) {
        return Err(UploadError::Malformed(format!(
            "unusable image URL {:?}",
            result.url
        )));
    }
    Ok(result)
}

/// Absolute `http(s)` URL or a site-relative path (not protocol-relative).
fn is_usable_image_url(raw: &str) -> bool {
    if raw.starts_with('/') {
        return !raw.starts_with("//");
    }
    Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}
