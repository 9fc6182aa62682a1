// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Content block codec for embeds.
//!
//! The host editor keeps custom HTML blocks as a three-token sequence (open tag, inner
//! HTML, close tag). Encoding preserves attributes verbatim; decoding rebuilds the element.
//! No validation happens here; that is the sanitizer's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::embed::embed_element;
use crate::models::fragment::{Element, Fragment, FragmentError, write_close_tag, write_open_tag};
use crate::models::video::VideoId;

/// One token of the editor's block renderer protocol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlockToken {
    #[serde(rename_all = "camelCase")]
    OpenTag {
        tag_name: String,
        outer_new_line: bool,
        attributes: BTreeMap<String, String>,
    },
    Html {
        content: String,
    },
    #[serde(rename_all = "camelCase")]
    CloseTag {
        tag_name: String,
        outer_new_line: bool,
    },
}

/// Structural decoding failures.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("expected open/html/close tokens, got {0} token(s) in another shape")]
    Shape(usize),
    #[error("open tag <{open}> closed by </{close}>")]
    MismatchedTags { open: String, close: String },
    #[error("block content is not a usable fragment: {0}")]
    Content(#[from] FragmentError),
}

/// Encode a block element into open/content/close tokens.
pub fn encode(element: &Element) -> [BlockToken; 3] {
    [
        BlockToken::OpenTag {
            tag_name: element.tag.clone(),
            outer_new_line: true,
            attributes: element.attrs.clone(),
        },
        BlockToken::Html {
            content: element.inner_html(),
        },
        BlockToken::CloseTag {
            tag_name: element.tag.clone(),
            outer_new_line: true,
        },
    ]
}

/// Rebuild the element from its token sequence.
///
/// # Errors
///
/// Fails when the tokens are not exactly open/html/close, when the tag names disagree, or
/// when the inner HTML cannot be parsed.
pub fn decode(tokens: &[BlockToken]) -> Result<Element, CodecError> {
    let [
        BlockToken::OpenTag {
            tag_name: open,
            attributes,
            ..
        },
        BlockToken::Html { content },
        BlockToken::CloseTag {
            tag_name: close, ..
        },
    ] = tokens
    else {
        return Err(CodecError::Shape(tokens.len()));
    };

    if open != close {
        return Err(CodecError::MismatchedTags {
            open: open.clone(),
            close: close.clone(),
        });
    }

    Ok(Element {
        tag: open.clone(),
        attrs: attributes.clone(),
        children: Fragment::parse(content)?.nodes,
    })
}

/// Render tokens to HTML the way the editor's block renderer does.
pub fn render_tokens(tokens: &[BlockToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            BlockToken::OpenTag {
                tag_name,
                outer_new_line,
                attributes,
            } => {
                if *outer_new_line {
                    out.push('\n');
                }
                write_open_tag(&mut out, tag_name, attributes);
            }
            BlockToken::Html { content } => out.push_str(content),
            BlockToken::CloseTag {
                tag_name,
                outer_new_line,
            } => {
                write_close_tag(&mut out, tag_name);
                if *outer_new_line {
                    out.push('\n');
                }
            }
        }
    }
    out
}

/// Synthesize, encode and render the embed block for `id`.
pub fn render_embed(id: &VideoId) -> String {
    render_tokens(&encode(&embed_element(id)))
}
