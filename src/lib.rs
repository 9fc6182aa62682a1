// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Rich-content pipeline for the notice/FAQ editor.
//!
//! Sanitizes HTML against a fixed allowlist, turns pasted video links into embeds through a
//! debounced reconciliation pass, and uploads pasted or dropped images instead of inlining
//! them. The host editor is reached only through [`EditorDocument`].

pub mod config;
pub mod logic;
pub mod models;
pub mod mvu;
pub mod runtime;
pub mod utils;

pub use config::SessionConfig;
pub use logic::sanitize::{sanitize, sanitize_html};
pub use logic::upload::{HttpUploadGateway, UploadError, UploadGateway, UploadResult};
pub use models::clipboard::{ClipboardItem, ImagePayload, PastePayload};
pub use models::document::{EditorDocument, MemoryDocument};
pub use models::fragment::{Element, Fragment, Node};
pub use mvu::paste::PasteDisposition;
pub use runtime::EditorRuntime;
