// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Owned HTML fragment tree shared by the sanitizer, the embed helpers and the block codec.
//!
//! Parsing goes through `scraper` (html5ever) in body context; comments, doctypes and
//! processing instructions have no representation here and disappear at parse time.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use thiserror::Error;

/// Deepest element nesting accepted by [`Fragment::parse`].
pub const MAX_DEPTH: usize = 512;

/// Elements serialized without children or a closing tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are written verbatim.
const RAW_TEXT_TAGS: &[&str] = &["iframe", "noembed", "noframes", "script", "style", "xmp"];

/// Elements whose first newline right after the start tag is swallowed by the parser.
const NEWLINE_STRIPPING_TAGS: &[&str] = &["listing", "pre", "textarea"];

/// Newlines to write after the start tag of a [`NEWLINE_STRIPPING_TAGS`] element.
#[derive(Clone, Copy)]
enum NewlineGuard {
    /// Output is parsed once: guard text that starts with a newline.
    Single,
    /// Output is parsed, re-serialized by a writer without a guard, then parsed again.
    Double,
}

/// Reasons a fragment could not be turned into a tree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("fragment nests deeper than {MAX_DEPTH} elements")]
    TooDeep,
}

/// Ordered sequence of top-level nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

/// Element or text node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// HTML element with lowercase tag name and attribute map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    /// Empty element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Attribute value by exact name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Serialized children only.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = RAW_TEXT_TAGS.contains(&self.tag.as_str());
        for child in &self.children {
            write_node(&mut out, child, raw, NewlineGuard::Single, &mut |_| None);
        }
        out
    }

    /// Serialized element including its own tags.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self, NewlineGuard::Single, &mut |_| None);
        out
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parse an HTML fragment in body context.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentError::TooDeep`] when elements nest deeper than [`MAX_DEPTH`].
    pub fn parse(html: &str) -> Result<Self, FragmentError> {
        let dom = Html::parse_fragment(html);
        let nodes = convert_children(dom.root_element(), 1)?;
        Ok(Self { nodes })
    }

    /// Serialize to an HTML string.
    pub fn to_html(&self) -> String {
        self.to_html_with(|_| None)
    }

    /// Serialize, letting `replace` substitute raw HTML for any element it recognizes.
    ///
    /// Returning `Some(html)` writes `html` in place of the element and skips its subtree.
    pub fn to_html_with<F>(&self, mut replace: F) -> String
    where
        F: FnMut(&Element) -> Option<String>,
    {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, false, NewlineGuard::Single, &mut replace);
        }
        out
    }

    /// Serialization for a round trip through another HTML writer (ammonia) and back.
    ///
    /// Leading newlines of `pre` text survive both parses.
    pub(crate) fn to_html_for_reparse(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node, false, NewlineGuard::Double, &mut |_| None);
        }
        out
    }

    /// All elements in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.nodes, &mut out);
        out
    }
}

fn convert_children(parent: ElementRef<'_>, depth: usize) -> Result<Vec<Node>, FragmentError> {
    if depth > MAX_DEPTH {
        return Err(FragmentError::TooDeep);
    }
    let mut nodes = Vec::new();
    for child in parent.children() {
        if let Some(element) = ElementRef::wrap(child) {
            let value = element.value();
            nodes.push(Node::Element(Element {
                tag: value.name().to_ascii_lowercase(),
                attrs: value
                    .attrs()
                    .map(|(name, val)| (name.to_string(), val.to_string()))
                    .collect(),
                children: convert_children(element, depth + 1)?,
            }));
        } else if let Some(text) = child.value().as_text() {
            nodes.push(Node::Text(String::from(&**text)));
        }
    }
    Ok(nodes)
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            out.push(el);
            collect_elements(&el.children, out);
        }
    }
}

fn write_node<F>(out: &mut String, node: &Node, raw_text: bool, guard: NewlineGuard, replace: &mut F)
where
    F: FnMut(&Element) -> Option<String>,
{
    match node {
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => escape_text(out, text),
        Node::Element(el) => write_element(out, el, guard, replace),
    }
}

fn write_element<F>(out: &mut String, el: &Element, guard: NewlineGuard, replace: &mut F)
where
    F: FnMut(&Element) -> Option<String>,
{
    if let Some(html) = replace(el) {
        out.push_str(&html);
        return;
    }
    write_open_tag(out, &el.tag, &el.attrs);
    if VOID_TAGS.contains(&el.tag.as_str()) {
        return;
    }
    if NEWLINE_STRIPPING_TAGS.contains(&el.tag.as_str()) {
        match guard {
            NewlineGuard::Single => {
                if matches!(el.children.first(), Some(Node::Text(text)) if text.starts_with('\n')) {
                    out.push('\n');
                }
            }
            NewlineGuard::Double => out.push_str("\n\n"),
        }
    }
    let raw = RAW_TEXT_TAGS.contains(&el.tag.as_str());
    for child in &el.children {
        write_node(out, child, raw, guard, replace);
    }
    write_close_tag(out, &el.tag);
}

pub(crate) fn write_open_tag(out: &mut String, tag: &str, attrs: &BTreeMap<String, String>) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn write_close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}
