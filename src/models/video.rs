// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Video identifier for the approved provider (YouTube).

use std::fmt;

/// Canonical embeddable URL prefix; the identifier is appended verbatim.
pub const EMBED_URL_PREFIX: &str = "https://www.youtube.com/embed/";

/// Opaque 11-character YouTube video identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Number of characters in every identifier.
    pub const LEN: usize = 11;

    /// Accept `raw` when it has the provider's identifier shape.
    pub fn parse(raw: &str) -> Option<Self> {
        (raw.len() == Self::LEN && raw.chars().all(is_id_char)).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical embed URL, e.g. `https://www.youtube.com/embed/dQw4w9WgXcQ`.
    pub fn embed_url(&self) -> String {
        format!("{EMBED_URL_PREFIX}{}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Character class of the identifier alphabet.
pub fn is_id_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}
