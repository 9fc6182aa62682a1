// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Paste and drop payloads as reported by the host clipboard API.

use std::path::Path;

use crate::utils::sanitize_component;

/// One entry of a clipboard or drag-and-drop data transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClipboardItem {
    /// Plain text flavour.
    Text(String),
    /// Binary file flavour (screenshots, dragged files).
    File {
        mime: String,
        name: Option<String>,
        bytes: Vec<u8>,
    },
}

/// Everything a single paste event carried.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PastePayload {
    pub items: Vec<ClipboardItem>,
}

impl PastePayload {
    /// Payload holding only plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            items: vec![ClipboardItem::Text(text.into())],
        }
    }

    /// Split into the first usable image and the first text flavour.
    ///
    /// Files that are not `image/*` or carry no bytes are treated as absent.
    pub fn into_parts(self) -> (Option<ImagePayload>, Option<String>) {
        let mut image = None;
        let mut text = None;
        for item in self.items {
            match item {
                ClipboardItem::Text(t) if text.is_none() => text = Some(t),
                ClipboardItem::File { mime, name, bytes } if image.is_none() => {
                    let candidate = ImagePayload { mime, name, bytes };
                    if candidate.is_image() {
                        image = Some(candidate);
                    }
                }
                _ => {}
            }
        }
        (image, text)
    }
}

/// Binary image extracted from a paste or drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime: String,
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            name: None,
            bytes,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// True for a non-empty `image/*` blob.
    pub fn is_image(&self) -> bool {
        !self.bytes.is_empty()
            && self
                .mime
                .get(..6)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }

    /// File name for the multipart `file` field.
    ///
    /// Uses the sanitized original name when there is one and appends an extension
    /// derived from the MIME type when the name has none.
    pub fn file_name(&self) -> String {
        let ext = extension_for(&self.mime);
        match self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                let clean = sanitize_component(name);
                if Path::new(&clean).extension().is_some() {
                    clean
                } else {
                    format!("{clean}.{ext}")
                }
            }
            None => format!("image.{ext}"),
        }
    }
}

/// Preferred extension for a MIME type: the subtype itself when `mime_guess` knows it.
fn extension_for(mime: &str) -> &'static str {
    let Some(exts) = mime_guess::get_mime_extensions_str(mime) else {
        return "bin";
    };
    let subtype = mime.split_once('/').map(|(_, sub)| sub).unwrap_or_default();
    exts.iter()
        .find(|ext| ext.eq_ignore_ascii_case(subtype))
        .or_else(|| exts.first())
        .copied()
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_parts_prefers_first_image_and_text() {
        let payload = PastePayload {
            items: vec![
                ClipboardItem::Text("caption".into()),
                ClipboardItem::File {
                    mime: "image/png".into(),
                    name: None,
                    bytes: vec![1, 2, 3],
                },
                ClipboardItem::Text("ignored".into()),
            ],
        };

        let (image, text) = payload.into_parts();

        assert_eq!(image.map(|i| i.bytes), Some(vec![1, 2, 3]));
        assert_eq!(text.as_deref(), Some("caption"));
    }

    // Malformed payloads fall through as "no image".
    #[test]
    fn into_parts_ignores_empty_or_non_image_files() {
        let payload = PastePayload {
            items: vec![
                ClipboardItem::File {
                    mime: "image/png".into(),
                    name: None,
                    bytes: Vec::new(),
                },
                ClipboardItem::File {
                    mime: "application/pdf".into(),
                    name: Some("doc.pdf".into()),
                    bytes: vec![0x25],
                },
            ],
        };

        let (image, text) = payload.into_parts();

        assert!(image.is_none());
        assert!(text.is_none());
    }

    #[test]
    fn file_name_defaults_from_mime() {
        assert_eq!(ImagePayload::new("image/png", vec![1]).file_name(), "image.png");
        assert_eq!(ImagePayload::new("image/jpeg", vec![1]).file_name(), "image.jpeg");
        assert_eq!(
            ImagePayload::new("image/x-unknown-thing", vec![1]).file_name(),
            "image.bin"
        );
    }

    #[test]
    fn file_name_sanitizes_original_name() {
        let named = ImagePayload::new("image/png", vec![1]).with_name("My Shot (1).png");
        assert_eq!(named.file_name(), "My_Shot_1.png");

        let no_ext = ImagePayload::new("image/gif", vec![1]).with_name("funny");
        assert_eq!(no_ext.file_name(), "funny.gif");
    }

    #[test]
    fn is_image_checks_mime_case_insensitively() {
        assert!(ImagePayload::new("IMAGE/PNG", vec![1]).is_image());
        assert!(!ImagePayload::new("text/plain", vec![1]).is_image());
    }
}
