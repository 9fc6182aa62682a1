// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Reconciliation pass: turn URL-only paragraphs into embed blocks.

use tracing::debug;

use crate::logic::codec::render_embed;
use crate::logic::embed::match_whole_url;
use crate::models::document::EditorDocument;
use crate::models::fragment::Fragment;
use crate::models::video::VideoId;

/// Rewritten document plus the embeds it gained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub html: String,
    pub embeds: Vec<VideoId>,
}

/// Replace every `<p>` whose whole text is one recognized video URL.
///
/// Returns `None` when nothing matched, so callers can skip the write entirely; a document
/// whose links were already converted therefore never changes again.
pub fn reconcile_html(html: &str) -> Option<Reconciled> {
    let fragment = match Fragment::parse(html) {
        Ok(fragment) => fragment,
        Err(err) => {
            debug!(%err, "skipping reconciliation of unparseable document");
            return None;
        }
    };

    let mut embeds = Vec::new();
    let rewritten = fragment.to_html_with(|el| {
        if el.tag != "p" {
            return None;
        }
        let id = match_whole_url(&el.text_content())?;
        let block = render_embed(&id);
        embeds.push(id);
        Some(block)
    });

    if embeds.is_empty() {
        None
    } else {
        Some(Reconciled {
            html: rewritten,
            embeds,
        })
    }
}

/// Read-modify-write the live document; returns how many embeds were created.
pub fn reconcile_document<D: EditorDocument + ?Sized>(document: &mut D) -> usize {
    let Some(reconciled) = reconcile_html(&document.html()) else {
        return 0;
    };
    document.set_html(&reconciled.html);
    for id in &reconciled.embeds {
        debug!(video = %id, "converted link paragraph into embed");
    }
    reconciled.embeds.len()
}
