//! Flow collections: single-line `[a, b]` sequences and `{k: v}` mappings.
//!
//! Items are separated by commas at bracket depth zero, outside quotes, so
//! flow collections nest. Quotes only open a quoted region at the start of
//! an item, a key, or a value; an apostrophe inside a word is plain text.

use std::collections::HashMap;

use crate::error::{ParseContext, ParseError, Result};
use crate::node::Node;
use crate::scalar;
use crate::scanner::trim_blank;

/// Where the flow text sits in the source, for error locations.
#[derive(Clone, Copy)]
pub struct FlowPos<'c> {
    pub ctx: &'c ParseContext,
    pub line: usize,
    /// 1-based column of the first byte of the flow text.
    pub col: usize,
}

impl FlowPos<'_> {
    fn shifted(self, offset: usize) -> Self {
        FlowPos {
            col: self.col + offset,
            ..self
        }
    }
}

/// Whether text opens a flow collection.
pub fn is_flow_start(text: &str) -> bool {
    text.starts_with('[') || text.starts_with('{')
}

/// Whether text is wrapped in `[...]` or `{...}`. Only such values are
/// flow collections; `[not closed` is plain text.
pub fn is_flow_delimited(text: &str) -> bool {
    (text.starts_with('[') && text.ends_with(']'))
        || (text.starts_with('{') && text.ends_with('}'))
}

/// Parse text that starts with `[` or `{`.
///
/// Returns `Ok(None)` when the collection closes before the end of the text
/// (`[draft] notes`); the caller keeps such text as a plain scalar.
pub fn parse_flow(text: &str, pos: FlowPos<'_>) -> Result<Option<Node>> {
    let close = closing_index(text, pos)?;
    if close != text.len() - 1 {
        return Ok(None);
    }

    let inner = &text[1..close];
    let inner_pos = pos.shifted(1);
    let node = if text.starts_with('[') {
        parse_sequence(inner, inner_pos)?
    } else {
        parse_mapping(inner, inner_pos)?
    };
    Ok(Some(node))
}

fn parse_sequence(inner: &str, pos: FlowPos<'_>) -> Result<Node> {
    let mut items = Vec::new();
    for (offset, item) in split_top_level(inner, ',') {
        let lead = item.len() - item.trim_start_matches([' ', '\t']).len();
        let item = trim_blank(item);
        if item.is_empty() {
            continue;
        }
        items.push(parse_item(item, pos.shifted(offset + lead))?);
    }
    Ok(Node::Sequence(items))
}

fn parse_mapping(inner: &str, pos: FlowPos<'_>) -> Result<Node> {
    let mut map = HashMap::new();
    for (offset, item) in split_top_level(inner, ',') {
        let lead = item.len() - item.trim_start_matches([' ', '\t']).len();
        let item_pos = pos.shifted(offset + lead);
        let item = trim_blank(item);
        if item.is_empty() {
            continue;
        }

        let Some(colon) = find_top_level(item, ':') else {
            return Err(ParseError::FlowMissingColon(
                item.to_string(),
                item_pos.ctx.at(item_pos.line, item_pos.col),
            ));
        };
        let key = trim_blank(&item[..colon]);
        if key.is_empty() {
            return Err(ParseError::FlowEmptyKey(
                item_pos.ctx.at(item_pos.line, item_pos.col),
            ));
        }
        let key = scalar::dequote(key).unwrap_or_else(|| key.to_string());

        let after = &item[colon + 1..];
        let lead = after.len() - after.trim_start_matches([' ', '\t']).len();
        let value = trim_blank(after);
        let node = parse_item(value, item_pos.shifted(colon + 1 + lead))?;
        map.insert(key, node);
    }
    Ok(Node::Mapping(map))
}

/// A single flow item: a nested collection, a quoted scalar, or plain text.
fn parse_item(item: &str, pos: FlowPos<'_>) -> Result<Node> {
    if is_flow_start(item) {
        if let Some(node) = parse_flow(item, pos)? {
            return Ok(node);
        }
    }
    Ok(Node::plain(
        scalar::dequote(item).unwrap_or_else(|| item.to_string()),
    ))
}

/// Byte index of the closer matching the opener at index 0.
fn closing_index(text: &str, pos: FlowPos<'_>) -> Result<usize> {
    let mut stack = Vec::new();
    for (i, c) in unquoted_chars(text) {
        match c {
            '[' | '{' => stack.push(c),
            ']' | '}' => {
                let open = if c == ']' { '[' } else { '{' };
                match stack.pop() {
                    Some(o) if o == open => {
                        if stack.is_empty() {
                            return Ok(i);
                        }
                    }
                    _ => {
                        return Err(ParseError::UnmatchedFlow(
                            c,
                            pos.ctx.at(pos.line, pos.col + i),
                        ))
                    }
                }
            }
            _ => {}
        }
    }
    let kind = if text.starts_with('[') {
        "sequence"
    } else {
        "mapping"
    };
    Err(ParseError::UnterminatedFlow(kind, pos.ctx.at(pos.line, pos.col)))
}

/// Split balanced flow content on a separator at depth zero.
/// Yields each piece with its byte offset.
fn split_top_level(s: &str, sep: char) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in unquoted_chars(s) {
        match c {
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                pieces.push((start, &s[start..i]));
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push((start, &s[start..]));
    pieces
}

/// First occurrence of a character at depth zero, outside quotes.
fn find_top_level(s: &str, target: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in unquoted_chars(s) {
        match c {
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            c if c == target && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Characters outside quoted regions, with their byte offsets.
fn unquoted_chars(s: &str) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    // Last non-blank character seen; quotes only open after a delimiter.
    let mut prev: Option<char> = None;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
                prev = Some(c);
            }
            continue;
        }
        if (c == '"' || c == '\'') && matches!(prev, None | Some('[' | '{' | ',' | ':')) {
            quote = Some(c);
            continue;
        }
        out.push((i, c));
        if c != ' ' && c != '\t' {
            prev = Some(c);
        }
    }
    out
}
