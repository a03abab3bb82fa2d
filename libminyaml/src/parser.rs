//! Indentation stack machine
//!
//! The machine reads significant lines one at a time and keeps a stack of
//! open frames, each pairing a container with the indentation that keeps it
//! open. Nodes live in an arena and frames hold arena indices, so opening
//! and closing blocks never touches references into the tree. The finished
//! arena is folded into an owned [`Node`] tree at the end.
//!
//! Per line:
//! - A line with no colon that does not start a sequence item continues the
//!   last plain mapping scalar, if there is one.
//! - Frames are closed while the line is not indented past them.
//! - The first line inside a frame fixes that frame's child indent; later
//!   lines must match it exactly.
//! - A `-` line adds a sequence item, anything else a mapping entry.

use std::collections::HashMap;
use std::io;

use log::{debug, trace};

use crate::block::{read_block_scalar, BlockHeader};
use crate::error::{ParseContext, ParseError, Result};
use crate::flow::{is_flow_delimited, parse_flow, FlowPos};
use crate::node::{Node, Scalar, ScalarStyle};
use crate::scalar::dequote;
use crate::scanner::{is_sequence_item, trim_blank, ScanLine, Scanner};

/// Parse a line source into a mapping-rooted tree.
pub fn parse_lines<I>(lines: I, ctx: &ParseContext) -> Result<Node>
where
    I: Iterator<Item = io::Result<String>>,
{
    debug!(
        "parsing {}",
        ctx.filename.as_deref().unwrap_or("<input>")
    );
    let mut machine = Machine::new(Scanner::new(lines, ctx));
    while let Some(line) = machine.scanner.next_line()? {
        machine.process(line)?;
    }
    let lines_read = machine.scanner.lines_read();
    let root = machine.arena.build(ROOT);
    debug!(
        "parsed {} lines into {} top-level keys",
        lines_read,
        root.len()
    );
    Ok(root)
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Sequence,
    Mapping,
}

#[derive(Debug)]
enum Draft {
    /// Placeholder whose kind is settled by its first child line. The hint
    /// is the kind it takes if no child ever arrives.
    Pending(Kind),
    Scalar(Scalar),
    Sequence(Vec<NodeId>),
    /// Entries in source order; later duplicates win when built.
    Mapping(Vec<(String, NodeId)>),
    /// A finished subtree (flow collections).
    Built(Node),
}

struct Arena {
    drafts: Vec<Draft>,
}

impl Arena {
    fn new() -> Self {
        Self {
            drafts: vec![Draft::Mapping(Vec::new())],
        }
    }

    fn alloc(&mut self, draft: Draft) -> NodeId {
        self.drafts.push(draft);
        NodeId(self.drafts.len() - 1)
    }

    /// Settle a placeholder as `kind`. Succeeds if the node already is that
    /// kind; fails if it is anything else.
    fn promote(&mut self, id: NodeId, kind: Kind) -> bool {
        let slot = &mut self.drafts[id.0];
        let promoted = match (&*slot, kind) {
            (Draft::Pending(_), Kind::Sequence) => Draft::Sequence(Vec::new()),
            (Draft::Pending(_), Kind::Mapping) => Draft::Mapping(Vec::new()),
            (Draft::Sequence(_), Kind::Sequence) | (Draft::Mapping(_), Kind::Mapping) => {
                return true
            }
            _ => return false,
        };
        trace!("promoted node {} to {:?}", id.0, kind);
        *slot = promoted;
        true
    }

    fn push_item(&mut self, seq: NodeId, item: NodeId) {
        if let Draft::Sequence(items) = &mut self.drafts[seq.0] {
            items.push(item);
        }
    }

    fn insert(&mut self, map: NodeId, key: String, value: NodeId) {
        if let Draft::Mapping(entries) = &mut self.drafts[map.0] {
            entries.push((key, value));
        }
    }

    fn continue_scalar(&mut self, id: NodeId, line: &str) {
        if let Draft::Scalar(scalar) = &mut self.drafts[id.0] {
            scalar.text.push('\n');
            scalar.text.push_str(line);
        }
    }

    fn build(&mut self, id: NodeId) -> Node {
        match std::mem::replace(&mut self.drafts[id.0], Draft::Pending(Kind::Mapping)) {
            Draft::Pending(Kind::Sequence) => Node::Sequence(Vec::new()),
            Draft::Pending(Kind::Mapping) => Node::Mapping(HashMap::new()),
            Draft::Scalar(scalar) => Node::Scalar(scalar),
            Draft::Sequence(items) => {
                Node::Sequence(items.into_iter().map(|item| self.build(item)).collect())
            }
            Draft::Mapping(entries) => {
                let mut map = HashMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let node = self.build(value);
                    map.insert(key, node);
                }
                Node::Mapping(map)
            }
            Draft::Built(node) => node,
        }
    }
}

// ============================================================================
// Machine
// ============================================================================

#[derive(Debug)]
struct Frame {
    node: NodeId,
    /// Lines indented at or below this close the frame.
    indent: isize,
    /// Indent of the frame's children, fixed by the first child line.
    child_indent: Option<usize>,
    /// A sequence written at its key's own indent (`key:` then `- a`).
    /// A non-item line at the child indent closes it.
    compact: bool,
}

impl Frame {
    fn root() -> Self {
        Self {
            node: ROOT,
            indent: -1,
            child_indent: None,
            compact: false,
        }
    }
}

struct Machine<'c, I> {
    scanner: Scanner<'c, I>,
    arena: Arena,
    stack: Vec<Frame>,
    /// Plain mapping scalar that a following colon-free line extends.
    last_scalar: Option<NodeId>,
}

impl<'c, I> Machine<'c, I>
where
    I: Iterator<Item = io::Result<String>>,
{
    fn new(scanner: Scanner<'c, I>) -> Self {
        Self {
            scanner,
            arena: Arena::new(),
            stack: vec![Frame::root()],
            last_scalar: None,
        }
    }

    fn ctx(&self) -> &'c ParseContext {
        self.scanner.ctx()
    }

    fn process(&mut self, line: ScanLine) -> Result<()> {
        let is_item = line.is_sequence_item();

        if let Some(target) = self.last_scalar {
            if !is_item && !line.content.contains(':') {
                self.arena.continue_scalar(target, &line.content);
                return Ok(());
            }
        }
        self.last_scalar = None;

        self.close_frames(&line, is_item);
        self.check_indent(&line)?;

        let container = self.top().node;
        if is_item {
            self.sequence_item(container, line.indent, &line.content, line.line_num)
        } else {
            self.mapping_entry(container, line.indent, &line.content, line.line_num)
        }
    }

    fn top(&self) -> &Frame {
        // The root frame is never popped.
        &self.stack[self.stack.len() - 1]
    }

    fn push_frame(&mut self, frame: Frame) {
        trace!(
            "open frame for node {} at indent {}",
            frame.node.0,
            frame.indent
        );
        self.stack.push(frame);
    }

    fn close_frames(&mut self, line: &ScanLine, is_item: bool) {
        while self.stack.len() > 1 {
            let top = self.top();
            let dedented = (line.indent as isize) <= top.indent;
            let leaves_compact =
                top.compact && !is_item && top.child_indent == Some(line.indent);
            if !dedented && !leaves_compact {
                break;
            }
            if let Some(frame) = self.stack.pop() {
                trace!(
                    "close frame for node {} at line {}",
                    frame.node.0,
                    line.line_num
                );
            }
        }
    }

    fn check_indent(&mut self, line: &ScanLine) -> Result<()> {
        let ctx = self.ctx();
        let top = self.stack.len() - 1;
        let frame = &mut self.stack[top];
        match frame.child_indent {
            None => {
                frame.child_indent = Some(line.indent);
                Ok(())
            }
            Some(expected) if expected == line.indent => Ok(()),
            Some(expected) if line.indent > expected => Err(ParseError::UnexpectedIndent(
                ctx.at(line.line_num, line.indent + 1),
            )),
            Some(_) => Err(ParseError::InconsistentDedent(
                ctx.at(line.line_num, line.indent + 1),
            )),
        }
    }

    /// Handle `- ...` at 0-based column `dash_col`.
    fn sequence_item(
        &mut self,
        container: NodeId,
        dash_col: usize,
        content: &str,
        line_num: usize,
    ) -> Result<()> {
        let ctx = self.ctx();
        if !self.arena.promote(container, Kind::Sequence) {
            return Err(ParseError::UnexpectedSequenceItem(
                ctx.at(line_num, dash_col + 1),
            ));
        }

        let after = &content[1..];
        let rest = trim_blank(after);
        let rest_col = dash_col + 1 + (after.len() - after.trim_start_matches(' ').len());

        if rest.is_empty() {
            let item = self.arena.alloc(Draft::Pending(Kind::Mapping));
            self.arena.push_item(container, item);
            self.push_frame(Frame {
                node: item,
                indent: dash_col as isize,
                child_indent: None,
                compact: false,
            });
            return Ok(());
        }

        if is_sequence_item(rest) {
            let item = self.arena.alloc(Draft::Pending(Kind::Sequence));
            self.arena.push_item(container, item);
            self.push_frame(Frame {
                node: item,
                indent: dash_col as isize,
                child_indent: Some(rest_col),
                compact: false,
            });
            return self.sequence_item(item, rest_col, rest, line_num);
        }

        if is_mapping_shaped(rest) {
            let item = self.arena.alloc(Draft::Pending(Kind::Mapping));
            self.arena.push_item(container, item);
            self.push_frame(Frame {
                node: item,
                indent: dash_col as isize,
                child_indent: Some(rest_col),
                compact: false,
            });
            return self.mapping_entry(item, rest_col, rest, line_num);
        }

        let (item, _) = self.inline_value(rest, dash_col, rest_col, line_num)?;
        self.arena.push_item(container, item);
        Ok(())
    }

    /// Handle `key: value` whose key starts at 0-based column `key_col`.
    fn mapping_entry(
        &mut self,
        container: NodeId,
        key_col: usize,
        content: &str,
        line_num: usize,
    ) -> Result<()> {
        let ctx = self.ctx();
        let Some(colon) = content.find(':') else {
            return Err(ParseError::MissingColon(
                content.to_string(),
                ctx.at(line_num, key_col + 1),
            ));
        };

        let key = trim_blank(&content[..colon]);
        if key.is_empty() {
            return Err(ParseError::EmptyKey(ctx.at(line_num, key_col + 1)));
        }
        if !self.arena.promote(container, Kind::Mapping) {
            return Err(ParseError::UnexpectedMappingEntry(
                ctx.at(line_num, key_col + 1),
            ));
        }
        let key = dequote(key).unwrap_or_else(|| key.to_string());

        let after = &content[colon + 1..];
        let value = trim_blank(after);
        let value_col = key_col + colon + 1 + (after.len() - after.trim_start_matches(' ').len());

        if value.is_empty() {
            return self.open_block(container, key, key_col);
        }

        let (child, plain) = self.inline_value(value, key_col, value_col, line_num)?;
        self.arena.insert(container, key, child);
        if plain {
            self.last_scalar = Some(child);
        }
        Ok(())
    }

    /// `key:` with nothing after the colon: open a placeholder whose kind the
    /// next significant line suggests.
    fn open_block(&mut self, container: NodeId, key: String, key_col: usize) -> Result<()> {
        let next = self.scanner.peek_line()?;
        let next_is_item = next.as_ref().is_some_and(ScanLine::is_sequence_item);
        let compact = next_is_item && next.as_ref().is_some_and(|n| n.indent == key_col);
        let hint = if next_is_item {
            Kind::Sequence
        } else {
            Kind::Mapping
        };

        let child = self.arena.alloc(Draft::Pending(hint));
        self.arena.insert(container, key, child);
        self.push_frame(Frame {
            node: child,
            indent: key_col as isize - if compact { 1 } else { 0 },
            child_indent: compact.then_some(key_col),
            compact,
        });
        Ok(())
    }

    /// Build the node for non-empty inline value text. Returns the node and
    /// whether it is a plain scalar that later lines may continue.
    fn inline_value(
        &mut self,
        value: &str,
        header_col: usize,
        value_col: usize,
        line_num: usize,
    ) -> Result<(NodeId, bool)> {
        let ctx = self.ctx();

        if let Some(header) = BlockHeader::parse(value) {
            let text = read_block_scalar(&mut self.scanner, header_col, header)?;
            let id = self.arena.alloc(Draft::Scalar(Scalar {
                text,
                style: header.style,
            }));
            return Ok((id, false));
        }

        let (text, quoted) = match dequote(value) {
            Some(text) => (text, true),
            None => (value.to_string(), false),
        };
        if !quoted && !is_flow_delimited(&text) && text.contains(": ") {
            return Err(ParseError::AmbiguousColon(ctx.at(line_num, value_col + 1)));
        }

        if is_flow_delimited(&text) {
            let pos = FlowPos {
                ctx,
                line: line_num,
                col: value_col + 1,
            };
            if let Some(node) = parse_flow(&text, pos)? {
                return Ok((self.arena.alloc(Draft::Built(node)), false));
            }
        }

        let id = self.arena.alloc(Draft::Scalar(Scalar {
            text,
            style: ScalarStyle::Plain,
        }));
        Ok((id, true))
    }
}

/// Whether a sequence item's remainder is an inline `key: value`.
fn is_mapping_shaped(rest: &str) -> bool {
    let opener = rest.as_bytes()[0];
    !matches!(opener, b'"' | b'\'' | b'[' | b'{') && rest.contains(':')
}
