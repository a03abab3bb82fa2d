//! Write a tree back out as text.
//!
//! [`to_yaml_string`] produces text the parser reads back into an equal
//! tree: keys are sorted, small collections of plain scalars are written in
//! flow form, literal and folded scalars become block scalars, and any plain
//! scalar that would read back differently is double-quoted. Text containing
//! `#` cannot survive (comments are stripped before anything else), nor can
//! a block mapping key containing `:`.
//!
//! [`outline`] is a loose, human-oriented dump with no such guarantee.

use std::collections::HashMap;
use std::fmt;

use crate::block::BlockHeader;
use crate::flow::is_flow_start;
use crate::node::{Node, Scalar, ScalarStyle};
use crate::scalar::dequote;
use crate::scanner::{is_sequence_item, trim_blank};

/// Layout knobs for [`to_yaml_string_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Spaces per nesting level (at least one is used).
    pub indent: usize,
    /// Largest all-plain collection written in flow form.
    pub inline_limit: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            inline_limit: 5,
        }
    }
}

/// Emit a tree with default options.
pub fn to_yaml_string(node: &Node) -> String {
    to_yaml_string_with(node, &EmitOptions::default())
}

/// Emit a tree. Top-level collections are always written in block form.
pub fn to_yaml_string_with(node: &Node, options: &EmitOptions) -> String {
    let mut emitter = Emitter {
        out: String::new(),
        step: options.indent.max(1),
        inline_limit: options.inline_limit,
    };
    match node {
        Node::Mapping(map) => emitter.mapping(map, 0, false),
        Node::Sequence(items) => emitter.sequence(items, 0, false),
        Node::Scalar(scalar) => emitter.scalar(scalar, 0, Context::Value),
    }
    emitter.out
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_yaml_string(self))
    }
}

// =============================================================================
// Block emitter
// =============================================================================

/// Where a scalar lands; sequence items are stricter than mapping values.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Value,
    Item,
}

struct Emitter {
    out: String,
    step: usize,
    inline_limit: usize,
}

impl Emitter {
    fn pad(&mut self, col: usize) {
        self.out.extend(std::iter::repeat(' ').take(col));
    }

    /// Entries at column `col`. With `first_inline` the first entry continues
    /// the current line (after `- `).
    fn mapping(&mut self, map: &HashMap<String, Node>, col: usize, first_inline: bool) {
        for (i, key) in sorted_keys(map).into_iter().enumerate() {
            if !(first_inline && i == 0) {
                self.pad(col);
            }
            self.out.push_str(&block_key(key));
            self.out.push(':');
            self.value(&map[key], col, Context::Value);
        }
    }

    fn sequence(&mut self, items: &[Node], col: usize, first_inline: bool) {
        for (i, item) in items.iter().enumerate() {
            if !(first_inline && i == 0) {
                self.pad(col);
            }
            self.out.push('-');
            match item {
                Node::Mapping(map) if !self.fits_inline(item) && compact_first_key(map) => {
                    self.out.push(' ');
                    self.mapping(map, col + 2, true);
                }
                Node::Sequence(inner) if !self.fits_inline(item) => {
                    self.out.push(' ');
                    self.sequence(inner, col + 2, true);
                }
                _ => self.value(item, col, Context::Item),
            }
        }
    }

    /// Everything after `key:` or `-` whose indicator sits at `col`.
    fn value(&mut self, node: &Node, col: usize, ctx: Context) {
        match node {
            Node::Scalar(scalar) => {
                self.out.push(' ');
                self.scalar(scalar, col, ctx);
            }
            Node::Sequence(items) if self.fits_inline(node) => {
                self.out.push(' ');
                self.out.push_str(&flow_sequence(items));
                self.out.push('\n');
            }
            Node::Mapping(map) if self.fits_inline(node) => {
                self.out.push(' ');
                self.out.push_str(&flow_mapping(map));
                self.out.push('\n');
            }
            Node::Sequence(items) => {
                self.out.push('\n');
                self.sequence(items, col + self.step, false);
            }
            Node::Mapping(map) => {
                self.out.push('\n');
                self.mapping(map, col + self.step, false);
            }
        }
    }

    fn scalar(&mut self, scalar: &Scalar, col: usize, ctx: Context) {
        if let Some((header, lines)) = block_scalar(scalar) {
            self.out.push_str(&header);
            self.out.push('\n');
            for line in lines {
                if !line.is_empty() {
                    self.pad(col + self.step);
                    self.out.push_str(line);
                }
                self.out.push('\n');
            }
            return;
        }
        if plain_is_safe(&scalar.text, ctx) {
            self.out.push_str(&scalar.text);
        } else {
            self.out.push_str(&quoted(&scalar.text));
        }
        self.out.push('\n');
    }

    fn fits_inline(&self, node: &Node) -> bool {
        let all_plain = match node {
            Node::Scalar(_) => return false,
            Node::Sequence(items) => items.iter().all(is_plain_scalar),
            Node::Mapping(map) => map.values().all(is_plain_scalar),
        };
        node.is_empty() || (all_plain && node.len() <= self.inline_limit)
    }
}

fn is_plain_scalar(node: &Node) -> bool {
    node.style() == Some(ScalarStyle::Plain)
}

fn sorted_keys(map: &HashMap<String, Node>) -> Vec<&String> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    keys
}

// =============================================================================
// Block scalars
// =============================================================================

/// Header and body lines that read back as exactly this scalar, if any.
/// Lines are unindented; empty lines are written as blank lines.
fn block_scalar(scalar: &Scalar) -> Option<(String, Vec<&str>)> {
    let indicator = match scalar.style {
        ScalarStyle::Plain => return None,
        ScalarStyle::Literal => '|',
        ScalarStyle::Folded => '>',
    };
    let text = scalar.text.as_str();
    if text.is_empty() {
        return Some((format!("{}-", indicator), Vec::new()));
    }

    let body = text.trim_end_matches('\n');
    let trailing = text.len() - body.len();
    if body.is_empty() || body.starts_with('\n') || body.contains('\r') {
        return None;
    }

    let mut lines: Vec<&str> = Vec::new();
    match scalar.style {
        ScalarStyle::Folded => {
            // One blank line per newline; the folder joins nothing else.
            for (i, part) in body.split('\n').enumerate() {
                if !part.is_empty() && trim_blank(part) != part {
                    return None;
                }
                if i > 0 {
                    lines.push("");
                }
                if !part.is_empty() {
                    lines.push(part);
                }
            }
        }
        _ => {
            lines.extend(body.split('\n'));
            let content = || lines.iter().filter(|l| !l.is_empty());
            if content().any(|l| trim_blank(l).is_empty())
                || content().any(|l| l.trim_start_matches(' ').starts_with('\t'))
                || content().all(|l| l.starts_with(' '))
            {
                return None;
            }
        }
    }

    let chomp = match trailing {
        0 => "-",
        1 => "",
        _ => "+",
    };
    lines.extend(std::iter::repeat("").take(trailing.saturating_sub(1)));
    Some((format!("{}{}", indicator, chomp), lines))
}

// =============================================================================
// Plain, quoted and flow scalars
// =============================================================================

/// Whether text written bare after `key:` or `-` reads back unchanged.
fn plain_is_safe(text: &str, ctx: Context) -> bool {
    if text.is_empty() || trim_blank(text) != text {
        return false;
    }
    if text.contains(['\n', '\r']) || text.contains(": ") {
        return false;
    }
    if dequote(text).is_some() || is_flow_start(text) || BlockHeader::parse(text).is_some() {
        return false;
    }
    match ctx {
        Context::Value => true,
        Context::Item => !text.contains(':') && !is_sequence_item(text),
    }
}

fn key_is_safe(key: &str) -> bool {
    !key.is_empty()
        && trim_blank(key) == key
        && !key.contains([':', '\n', '\r'])
        && dequote(key).is_none()
        && !key.starts_with("- ")
}

fn block_key(key: &str) -> String {
    if key_is_safe(key) {
        key.to_string()
    } else {
        quoted(key)
    }
}

/// A block mapping may start on its `- ` line only when its first key
/// keeps the line mapping-shaped.
fn compact_first_key(map: &HashMap<String, Node>) -> bool {
    sorted_keys(map)
        .first()
        .is_some_and(|key| {
            key_is_safe(key) && !is_flow_start(key) && !key.starts_with(['"', '\''])
        })
}

fn flow_is_safe(text: &str) -> bool {
    !text.is_empty()
        && trim_blank(text) == text
        && !text.contains([':', ',', '[', ']', '{', '}', '\n', '\r'])
        && !text.starts_with(['"', '\''])
}

fn flow_scalar(text: &str) -> String {
    if flow_is_safe(text) {
        text.to_string()
    } else {
        quoted(text)
    }
}

fn flow_sequence(items: &[Node]) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|item| flow_scalar(item.as_str().unwrap_or_default()))
        .collect();
    format!("[{}]", items.join(", "))
}

fn flow_mapping(map: &HashMap<String, Node>) -> String {
    let items: Vec<String> = sorted_keys(map)
        .into_iter()
        .map(|k| {
            format!(
                "{}: {}",
                flow_scalar(k),
                flow_scalar(map[k].as_str().unwrap_or_default())
            )
        })
        .collect();
    format!("{{{}}}", items.join(", "))
}

fn quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

// =============================================================================
// Outline
// =============================================================================

/// Indented dump for reading, with keys sorted.
pub fn outline(node: &Node) -> String {
    let mut out = String::new();
    outline_into(node, 0, &mut out);
    out
}

fn outline_into(node: &Node, depth: usize, out: &mut String) {
    let pad = "  ".repeat(depth);
    match node {
        Node::Scalar(scalar) => match scalar.style {
            ScalarStyle::Plain => {
                out.push_str(&format!("{}{}\n", pad, scalar.text));
            }
            ScalarStyle::Literal | ScalarStyle::Folded => {
                let indicator = if scalar.style == ScalarStyle::Literal {
                    '|'
                } else {
                    '>'
                };
                out.push_str(&format!("{}{}\n", pad, indicator));
                for line in scalar.text.lines() {
                    out.push_str(&format!("{}  {}\n", pad, line));
                }
            }
        },
        Node::Sequence(items) => {
            for item in items {
                if is_plain_scalar(item) {
                    out.push_str(&format!("{}- {}\n", pad, item.as_str().unwrap_or_default()));
                } else {
                    out.push_str(&format!("{}-\n", pad));
                    outline_into(item, depth + 1, out);
                }
            }
        }
        Node::Mapping(map) => {
            for key in sorted_keys(map) {
                let value = &map[key];
                if is_plain_scalar(value) {
                    out.push_str(&format!(
                        "{}{}: {}\n",
                        pad,
                        key,
                        value.as_str().unwrap_or_default()
                    ));
                } else {
                    out.push_str(&format!("{}{}:\n", pad, key));
                    outline_into(value, depth + 1, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    fn round_trip(src: &str) -> String {
        let root = parse(src).unwrap().into_root();
        let text = to_yaml_string(&root);
        assert_eq!(parse(&text).unwrap().into_root(), root, "emitted:\n{}", text);
        text
    }

    #[test]
    fn test_block_and_flow_layout() {
        let text = round_trip(
            "server:\n  tags:\n    - a\n    - b\n    - c\n    - d\n    - e\n    - f\n  host: localhost\nports: [80, 443]\nname: demo\n",
        );
        assert_eq!(
            text,
            "name: demo\nports: [80, 443]\nserver:\n  host: localhost\n  tags:\n    - a\n    - b\n    - c\n    - d\n    - e\n    - f\n"
        );
    }

    #[test]
    fn test_block_scalars() {
        let text = round_trip("script: |\n  echo hi\n\n  exit 0\nnote: >-\n  folded\n  text\n");
        assert_eq!(
            text,
            "note: >-\n  folded text\nscript: |\n  echo hi\n\n  exit 0\n"
        );
    }

    #[test]
    fn test_block_scalar_chomp_and_paragraphs() {
        round_trip("keep: |+\n  a\n\n\nnext: 1\n");
        round_trip("empty: |\nnext: 1\n");
        round_trip("para: >\n  one\n  two\n\n  three\n\n\n  four\n");
        round_trip("code: |-\n  fn main() {\n      run();\n  }\n");
    }

    #[test]
    fn test_sequence_items() {
        let text = round_trip("servers:\n  - name: a\n    port: 1\n");
        assert_eq!(text, "servers:\n  - {name: a, port: 1}\n");

        let root = parse("servers:\n  - name: a\n    port: 1\n").unwrap().into_root();
        let options = EmitOptions {
            indent: 4,
            inline_limit: 0,
        };
        assert_eq!(
            to_yaml_string_with(&root, &options),
            "servers:\n    - name: a\n      port: 1\n"
        );
    }

    #[test]
    fn test_nested_sequences_and_placeholders() {
        round_trip("grid:\n  - - 1\n    - 2\n  - - 3\n    - - x\nempty:\nnone: []\n");
        round_trip("jobs:\n  - steps:\n      - |\n        make\n      - test\n    name: ci\n");
    }

    #[test]
    fn test_quoting() {
        let mut map = HashMap::new();
        map.insert("colon".to_string(), Node::plain("x: y"));
        map.insert("blank".to_string(), Node::plain(""));
        map.insert("padded".to_string(), Node::plain(" pad"));
        map.insert("lines".to_string(), Node::plain("a\nb"));
        map.insert("header".to_string(), Node::plain("|"));
        map.insert("a key".to_string(), Node::plain("v"));
        map.insert("- dash".to_string(), Node::plain("v"));
        let items = ["k: v", "- x", "'q'", "x:y", "plain", "", "x"];
        map.insert(
            "items".to_string(),
            Node::Sequence(items.iter().map(|s| Node::plain(*s)).collect()),
        );
        let root = Node::Mapping(map);

        let text = to_yaml_string(&root);
        assert!(text.contains("colon: \"x: y\"\n"));
        assert!(text.contains("lines: \"a\\nb\"\n"));
        assert!(text.contains("\"- dash\": v\n"));
        assert!(text.contains("  - \"k: v\"\n"));
        assert_eq!(parse(&text).unwrap().into_root(), root);
    }

    #[test]
    fn test_flow_quoting() {
        let mut map = HashMap::new();
        map.insert("k:1".to_string(), Node::plain("a, b"));
        map.insert("ok".to_string(), Node::plain("it's"));
        let mut root = HashMap::new();
        root.insert("m".to_string(), Node::Mapping(map));
        let root = Node::Mapping(root);

        let text = to_yaml_string(&root);
        assert_eq!(text, "m: {\"k:1\": \"a, b\", ok: it's}\n");
        assert_eq!(parse(&text).unwrap().into_root(), root);
    }

    #[test]
    fn test_display_matches_emitter() {
        let root = parse("b: 2\na: 1\n").unwrap().into_root();
        assert_eq!(root.to_string(), "a: 1\nb: 2\n");
    }

    #[test]
    fn test_outline() {
        let root = parse("list:\n  - x\n  - k: v\ntext: |\n  one\n  two\n").unwrap().into_root();
        assert_eq!(
            outline(&root),
            "list:\n  - x\n  -\n    k: v\ntext:\n  |\n    one\n    two\n"
        );
    }
}
