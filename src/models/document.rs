// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Seam to the host WYSIWYG editor: whole-document get/set only.

/// Live document owned by the host editor.
///
/// The pipeline never keeps references into the editor's internals; every mutation is a
/// fresh `html()` read followed by a `set_html()` write. Hosts forward the editor's change
/// notifications to the session themselves.
pub trait EditorDocument {
    /// Current document as an HTML fragment.
    fn html(&self) -> String;

    /// Replace the whole document.
    fn set_html(&mut self, html: &str);
}

/// In-memory document for headless hosts and tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    html: String,
    writes: usize,
}

impl MemoryDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            writes: 0,
        }
    }

    /// Number of `set_html` calls made through the pipeline.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Apply an author edit (typing, default paste) without counting it as a pipeline write.
    pub fn edit(&mut self, f: impl FnOnce(&mut String)) {
        f(&mut self.html);
    }
}

impl EditorDocument for MemoryDocument {
    fn html(&self) -> String {
        self.html.clone()
    }

    fn set_html(&mut self, html: &str) {
        self.html = html.to_string();
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorDocument, MemoryDocument};

    #[test]
    fn author_edits_do_not_count_as_writes() {
        let mut doc = MemoryDocument::new("<p>a</p>");
        doc.edit(|html| html.push_str("<p>b</p>"));
        assert_eq!(doc.writes(), 0);

        doc.set_html("<p>c</p>");
        assert_eq!(doc.html(), "<p>c</p>");
        assert_eq!(doc.writes(), 1);
    }
}
