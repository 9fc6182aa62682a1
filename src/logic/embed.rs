// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Video link recognition and embed synthesis.
//!
//! The synthesized `<iframe>` only uses attributes the sanitizer allows on embeds and a
//! `src` that satisfies [`is_allowed_embed_src`], so it always survives sanitization.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::fragment::{Element, Fragment, Node};
use crate::models::video::{VideoId, is_id_char};

/// Watch, short, shorts and embed URL shapes; scheme and `www.` optional.
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:https?://)?(?:www\.)?(?:youtube\.com/(?:watch\?v=|shorts/|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("video URL pattern compiles")
});

/// The only `src` an embed may carry.
static EMBED_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.)?youtube\.com/embed/[A-Za-z0-9_-]{11}$")
        .expect("embed source pattern compiles")
});

/// Tag used for video embeds.
pub const EMBED_TAG: &str = "iframe";

const EMBED_TITLE: &str = "YouTube video player";
const EMBED_ALLOW: &str = "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";
const EMBED_STYLE: &str = "width:100%; aspect-ratio:16/9;";

/// A recognized link and where it sits in the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoMatch {
    pub id: VideoId,
    /// Byte range of the matched URL (up to the end of the identifier).
    pub range: Range<usize>,
}

/// First recognized video link in `text`, with its position.
///
/// A candidate whose identifier runs on into more identifier characters is not a valid
/// 11-character id and is skipped.
pub fn match_video_at(text: &str) -> Option<VideoMatch> {
    VIDEO_URL.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        let id = caps.get(1)?;
        if text[id.end()..].chars().next().is_some_and(is_id_char) {
            return None;
        }
        Some(VideoMatch {
            id: VideoId::parse(id.as_str())?,
            range: whole.range(),
        })
    })
}

/// First recognized video identifier in `text`.
pub fn match_video(text: &str) -> Option<VideoId> {
    match_video_at(text).map(|m| m.id)
}

/// Every recognized identifier, scanning the remaining text after each hit.
pub fn find_all_videos(text: &str) -> Vec<VideoId> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(hit) = match_video_at(rest) {
        rest = &rest[hit.range.end..];
        found.push(hit.id);
    }
    found
}

/// Identifier when the whole of `text` (ignoring surrounding whitespace) is one video URL.
///
/// Trailing URL parts such as `&t=42` or `?si=..` are accepted; leading text or inner
/// whitespace is not.
pub fn match_whole_url(text: &str) -> Option<VideoId> {
    let text = text.trim();
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        return None;
    }
    let hit = match_video_at(text)?;
    (hit.range.start == 0).then_some(hit.id)
}

/// Embed source constraint.
pub fn is_allowed_embed_src(src: &str) -> bool {
    EMBED_SRC.is_match(src)
}

/// The embed element for `id`.
pub fn embed_element(id: &VideoId) -> Element {
    Element::new(EMBED_TAG)
        .with_attr("src", id.embed_url())
        .with_attr("title", EMBED_TITLE)
        .with_attr("frameborder", "0")
        .with_attr("allow", EMBED_ALLOW)
        .with_attr("allowfullscreen", "")
        .with_attr("loading", "lazy")
        .with_attr("style", EMBED_STYLE)
}

/// Fragment holding exactly one embed for `id`.
pub fn synthesize(id: &VideoId) -> Fragment {
    Fragment::new(vec![Node::Element(embed_element(id))])
}
