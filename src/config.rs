// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Session configuration (timings, upload endpoint) loaded from JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tunables for one editing session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Quiet period after the last change before reconciliation runs.
    pub debounce_ms: u64,
    /// Delay for the reconciliation scheduled by a text paste.
    pub paste_reconcile_delay_ms: u64,
    /// Base URL of the backend.
    pub base_url: String,
    /// Image endpoint, resolved against `base_url`.
    pub upload_endpoint: String,
    pub upload_timeout_secs: u64,
    /// Upload worker threads.
    pub upload_workers: usize,
    /// `alt` text of inserted images.
    pub uploaded_image_alt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            paste_reconcile_delay_ms: 0,
            base_url: "http://localhost:8000/".into(),
            upload_endpoint: "/api/admin/notices/upload-image".into(),
            upload_timeout_secs: 30,
            upload_workers: 2,
            uploaded_image_alt: "Uploaded image".into(),
        }
    }
}

impl SessionConfig {
    /// Read a JSON config file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse session config JSON")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn paste_reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.paste_reconcile_delay_ms)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// Absolute URL of the image endpoint.
    pub fn upload_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL {:?}", self.base_url))?;
        base.join(&self.upload_endpoint)
            .with_context(|| format!("Invalid upload endpoint {:?}", self.upload_endpoint))
    }
}
