// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Allowlist sanitizer guarding everything the editor persists.
//!
//! The allowlist is data: [`ALLOWED_TAGS`] and [`ALLOWED_ATTRIBUTES`]. Sanitizing runs in
//! two passes over an owned tree:
//!
//! 1. A structural prune that deletes non-allowlisted elements *with their whole subtree*,
//!    deletes embeds whose `src` fails the source constraint, empties embeds and filters
//!    attributes (always stripping `on*` handlers).
//! 2. Ammonia, configured from the same tables, which additionally drops URL attributes with
//!    unsafe schemes, strips comments and forces `target`/`rel` on anchors.
//!
//! The result is re-parsed so callers get a [`Fragment`] again.

use std::collections::{BTreeMap, HashMap, HashSet};

use ammonia::{Builder, UrlRelative};
use tracing::debug;

use crate::logic::embed::{EMBED_TAG, is_allowed_embed_src};
use crate::models::fragment::{Element, Fragment, MAX_DEPTH, Node};

/// Every tag that may appear in sanitized output.
pub const ALLOWED_TAGS: &[&str] = &[
    // block
    "div",
    "p",
    "br",
    "hr",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "code",
    "ul",
    "ol",
    "li",
    // inline
    "span",
    "b",
    "i",
    "em",
    "strong",
    "del",
    "a",
    // table
    "table",
    "thead",
    "tbody",
    "tr",
    "th",
    "td",
    // media
    "img",
    EMBED_TAG,
];

/// Per-tag attribute allowlist; tags not listed permit no attributes.
pub const ALLOWED_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href"]),
    ("img", &["src", "alt", "style", "width", "height", "loading"]),
    (
        EMBED_TAG,
        &["src", "title", "frameborder", "allow", "allowfullscreen", "loading", "style"],
    ),
    ("th", &["colspan", "rowspan"]),
    ("td", &["colspan", "rowspan"]),
];

/// Forced on every anchor.
pub const ANCHOR_TARGET: &str = "_blank";
/// Forced on every anchor.
pub const ANCHOR_REL: &str = "noopener noreferrer";

/// Schemes accepted in `href`/`src`; relative URLs pass through.
const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Attribute allowlist entry for `tag` (empty for general tags).
pub fn allowed_attributes(tag: &str) -> &'static [&'static str] {
    ALLOWED_ATTRIBUTES
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(tag))
        .map(|(_, attrs)| *attrs)
        .unwrap_or(&[])
}

/// `on*` event handler attribute, in any letter case.
pub fn is_event_handler(name: &str) -> bool {
    name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("on"))
}

pub fn is_allowed_attribute(tag: &str, name: &str) -> bool {
    !is_event_handler(name)
        && allowed_attributes(tag)
            .iter()
            .any(|a| a.eq_ignore_ascii_case(name))
}

/// Sanitize an owned fragment.
///
/// Never fails: anything that cannot be represented after cleaning yields an empty fragment.
/// Elements nested [`MAX_DEPTH`] or more levels deep are dropped, so trees built in code
/// are bounded the same way parsed ones are.
pub fn sanitize(fragment: Fragment) -> Fragment {
    let pruned = Fragment::new(prune_nodes(fragment.nodes, 1));
    let cleaned = allowlist_builder()
        .clean(&pruned.to_html_for_reparse())
        .to_string();
    match Fragment::parse(&cleaned) {
        Ok(reparsed) => Fragment::new(drop_unapproved_embeds(reparsed.nodes)),
        Err(err) => {
            debug!(%err, "sanitized output could not be re-parsed");
            Fragment::default()
        }
    }
}

/// Sanitize an HTML string; the form handed to the persistence API.
///
/// Unparseable input (nesting beyond the parser limit) sanitizes to the empty string.
pub fn sanitize_html(html: &str) -> String {
    match Fragment::parse(html) {
        Ok(fragment) => sanitize(fragment).to_html(),
        Err(err) => {
            debug!(%err, "discarding unparseable HTML");
            String::new()
        }
    }
}

fn allowlist_builder() -> Builder<'static> {
    let tag_attributes: HashMap<&str, HashSet<&str>> = ALLOWED_ATTRIBUTES
        .iter()
        .map(|&(tag, attrs)| (tag, attrs.iter().copied().collect()))
        .collect();

    let mut builder = Builder::default();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect())
        .generic_attributes(HashSet::new())
        .tag_attributes(tag_attributes)
        .url_schemes(URL_SCHEMES.iter().copied().collect())
        .url_relative(UrlRelative::PassThrough)
        .link_rel(Some(ANCHOR_REL))
        .set_tag_attribute_value("a", "target", ANCHOR_TARGET)
        .strip_comments(true);
    builder
}

fn prune_nodes(nodes: Vec<Node>, depth: usize) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Text(text) => Some(Node::Text(text)),
            Node::Element(el) => prune_element(el, depth).map(Node::Element),
        })
        .collect()
}

fn prune_element(mut el: Element, depth: usize) -> Option<Element> {
    el.tag.make_ascii_lowercase();
    if depth >= MAX_DEPTH {
        debug!(tag = %el.tag, depth, "dropping element nested too deep");
        discard(el.children);
        return None;
    }
    if !is_allowed_tag(&el.tag) {
        debug!(tag = %el.tag, "dropping element subtree outside the allowlist");
        discard(el.children);
        return None;
    }

    // Attribute names are case-insensitive; the first spelling in output order wins, as
    // it does when the serialized element is parsed again.
    let mut attrs = BTreeMap::new();
    for (name, value) in std::mem::take(&mut el.attrs) {
        attrs.entry(name.to_ascii_lowercase()).or_insert(value);
    }
    el.attrs = attrs;

    if el.tag == EMBED_TAG {
        let src = el.attr("src").unwrap_or_default();
        if !is_allowed_embed_src(src) {
            debug!(src, "dropping embed with unapproved source");
            return None;
        }
        el.children.clear();
    }

    let tag = el.tag.clone();
    el.attrs.retain(|name, _| is_allowed_attribute(&tag, name));
    el.children = prune_nodes(el.children, depth + 1);
    Some(el)
}

/// Final check on the cleaned tree: no embed leaves without an approved source.
fn drop_unapproved_embeds(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(el) if el.tag == EMBED_TAG => {
                if is_allowed_embed_src(el.attr("src").unwrap_or_default()) {
                    Some(Node::Element(el))
                } else {
                    debug!(src = el.attr("src"), "dropping embed after cleaning");
                    None
                }
            }
            Node::Element(mut el) => {
                el.children = drop_unapproved_embeds(el.children);
                Some(Node::Element(el))
            }
            text => Some(text),
        })
        .collect()
}

/// Drop a removed subtree without recursing through it.
fn discard(nodes: Vec<Node>) {
    let mut stack = nodes;
    while let Some(node) = stack.pop() {
        if let Node::Element(mut el) = node {
            stack.append(&mut el.children);
        }
    }
}
