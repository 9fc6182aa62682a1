// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Turn clipboard/drop file names into safe multipart upload names.

/// Name used when nothing usable survives sanitization.
pub const FALLBACK_NAME: &str = "image";

/// Produce a file name that is safe to hand to the upload endpoint.
///
/// # Steps
/// - Transliterate Unicode to ASCII with `deunicode` (e.g. "Café" → "Cafe").
/// - Keep ASCII alphanumerics plus `-`, `_`, `.`; everything else becomes `_`.
/// - Collapse runs of `_` and `.`, drop `_` right before a dot, trim edge dots/underscores.
///
/// The storage backend derives its object name from this value, so path separators and
/// control characters must never reach it.
pub fn sanitize_component(value: &str) -> String {
    let ascii = deunicode::deunicode(value);
    let mut out = String::with_capacity(ascii.len());

    for ch in ascii.chars() {
        let mapped = match ch {
            c if c.is_ascii_alphanumeric() || c == '-' => c,
            '.' => '.',
            _ => '_',
        };
        if mapped == '.' && out.ends_with('_') {
            out.pop();
        }
        if matches!(mapped, '_' | '.') && out.ends_with(mapped) {
            continue;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    trimmed.to_string()
}
