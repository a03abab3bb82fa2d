//! Block scalars: `|` literal and `>` folded text with chomp control.
//!
//! Extraction consumes every line indented deeper than the header line.
//! Blank lines inside the block are kept once content has started; blank
//! lines before the first content line are dropped. The first line at or
//! below the header indent ends the block and is handed back to the cursor.

use std::io;

use log::trace;

use crate::error::{ParseError, Result};
use crate::node::ScalarStyle;
use crate::scanner::{leading_indent, Scanner};

/// Trailing line break policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chomp {
    /// Default: exactly one trailing newline.
    Clip,
    /// `-`: no trailing newline.
    Strip,
    /// `+`: trailing newlines as written.
    Keep,
}

/// A parsed `|`, `|-`, `|+`, `>`, `>-` or `>+` indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub style: ScalarStyle,
    pub chomp: Chomp,
}

impl BlockHeader {
    /// Recognize a block scalar header. Anything else (`>= 5`, `|x|`) is
    /// not a header.
    pub fn parse(value: &str) -> Option<Self> {
        let style = match value.as_bytes().first()? {
            b'|' => ScalarStyle::Literal,
            b'>' => ScalarStyle::Folded,
            _ => return None,
        };
        let chomp = match &value[1..] {
            "" => Chomp::Clip,
            "-" => Chomp::Strip,
            "+" => Chomp::Keep,
            _ => return None,
        };
        Some(Self { style, chomp })
    }
}

/// Read the body of a block scalar whose header sits at `header_indent`.
pub fn read_block_scalar<I>(
    scanner: &mut Scanner<'_, I>,
    header_indent: usize,
    header: BlockHeader,
) -> Result<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    let raw = extract(scanner, header_indent)?;
    let text = match header.style {
        ScalarStyle::Folded => fold(&raw),
        _ => raw,
    };
    Ok(chomp(&text, header.chomp))
}

enum BlockLine {
    Blank,
    Content { indent: usize, text: String },
}

/// Collect the block's lines, strip their common indent and join them with
/// a newline after each line.
fn extract<I>(scanner: &mut Scanner<'_, I>, header_indent: usize) -> Result<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut lines = Vec::new();
    let mut has_content = false;

    while let Some(raw) = scanner.next_raw()? {
        if raw.is_blank() {
            if has_content {
                lines.push(BlockLine::Blank);
            }
            continue;
        }

        let indent = leading_indent(&raw.text)
            .map_err(|col| ParseError::TabInIndent(scanner.ctx().at(raw.line_num, col)))?;
        if indent <= header_indent {
            scanner.push_back(raw);
            break;
        }

        has_content = true;
        lines.push(BlockLine::Content {
            indent,
            text: raw.text[indent..].to_string(),
        });
    }

    let min_indent = lines
        .iter()
        .filter_map(|l| match l {
            BlockLine::Content { indent, .. } => Some(*indent),
            BlockLine::Blank => None,
        })
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for line in &lines {
        if let BlockLine::Content { indent, text } = line {
            out.extend(std::iter::repeat(' ').take(indent - min_indent));
            out.push_str(text);
        }
        out.push('\n');
    }

    trace!(
        "block scalar: {} lines below indent {}",
        lines.len(),
        header_indent
    );
    Ok(out)
}

/// Fold single line breaks between non-blank lines into spaces. Each blank
/// line between paragraphs stands for one newline. Trailing newlines are
/// left for chomping.
pub fn fold(text: &str) -> String {
    let body = text.trim_end_matches('\n');
    let trailing = &text[body.len()..];

    let mut out = String::with_capacity(text.len());
    let mut blanks = 0;
    let mut first = true;
    for line in body.split('\n') {
        let line = line.trim_end_matches([' ', '\t']);
        if line.is_empty() {
            blanks += 1;
            continue;
        }
        if !first {
            if blanks == 0 {
                out.push(' ');
            } else {
                out.extend(std::iter::repeat('\n').take(blanks));
            }
        }
        out.push_str(line);
        first = false;
        blanks = 0;
    }
    out.push_str(trailing);
    out
}

/// Apply a chomp policy to block text.
pub fn chomp(text: &str, chomp: Chomp) -> String {
    let body = text.trim_end_matches('\n');
    match chomp {
        Chomp::Strip => body.to_string(),
        Chomp::Keep => text.to_string(),
        Chomp::Clip if body.is_empty() => String::new(),
        Chomp::Clip => format!("{}\n", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseContext;
    use pretty_assertions::assert_eq;

    fn read(src: &str, header_indent: usize, header: &str) -> (String, Option<String>) {
        let ctx = ParseContext::new(None);
        let lines = src.lines().map(|l| Ok::<_, io::Error>(l.to_string()));
        let mut scanner = Scanner::new(lines, &ctx);
        let header = BlockHeader::parse(header).unwrap();
        let text = read_block_scalar(&mut scanner, header_indent, header).unwrap();
        let rest = scanner.next_line().unwrap().map(|l| l.content);
        (text, rest)
    }

    #[test]
    fn test_header_parse() {
        assert_eq!(
            BlockHeader::parse("|-"),
            Some(BlockHeader {
                style: ScalarStyle::Literal,
                chomp: Chomp::Strip
            })
        );
        assert_eq!(
            BlockHeader::parse(">+"),
            Some(BlockHeader {
                style: ScalarStyle::Folded,
                chomp: Chomp::Keep
            })
        );
        assert_eq!(BlockHeader::parse(">= 5"), None);
        assert_eq!(BlockHeader::parse("|x"), None);
        assert_eq!(BlockHeader::parse(""), None);
    }

    #[test]
    fn test_literal_keeps_inner_blank_lines() {
        let (text, rest) = read(
            "  First line.\n\n  Third line after empty.\n\n  Last line.\nnext: 1\n",
            0,
            "|",
        );
        assert_eq!(text, "First line.\n\nThird line after empty.\n\nLast line.\n");
        assert_eq!(rest.as_deref(), Some("next: 1"));
    }

    #[test]
    fn test_literal_keeps_relative_indent() {
        let (text, _) = read("    fn main() {\n        run();\n    }\n", 2, "|");
        assert_eq!(text, "fn main() {\n    run();\n}\n");
    }

    #[test]
    fn test_leading_blank_lines_dropped() {
        let (text, _) = read("\n\n  body\n", 0, "|");
        assert_eq!(text, "body\n");
    }

    #[test]
    fn test_chomp_variants() {
        let src = "  text\n\n\nafter: 1\n";
        assert_eq!(read(src, 0, "|").0, "text\n");
        assert_eq!(read(src, 0, "|-").0, "text");
        assert_eq!(read(src, 0, "|+").0, "text\n\n\n");
    }

    #[test]
    fn test_folded_paragraphs() {
        let (text, _) = read(
            "  First paragraph.\n\n  Second paragraph with more\n  text that folds.\n\n  Final line.\n",
            0,
            ">",
        );
        assert_eq!(
            text,
            "First paragraph.\nSecond paragraph with more text that folds.\nFinal line.\n"
        );
    }

    #[test]
    fn test_folded_strip() {
        let (text, _) = read(
            "  Note with trailing newline stripped.\n  Last line without trailing space.\n",
            0,
            ">-",
        );
        assert_eq!(
            text,
            "Note with trailing newline stripped. Last line without trailing space."
        );
    }

    #[test]
    fn test_trailing_spaces_folded_away_literal_kept() {
        assert_eq!(read("  one   \n  two  \n", 0, ">").0, "one two\n");
        assert_eq!(read("  one   \n  two\n", 0, "|").0, "one   \ntwo\n");
    }

    #[test]
    fn test_empty_block() {
        for header in ["|", "|-", "|+", ">", ">+"] {
            let (text, rest) = read("non-indented line\n", 0, header);
            assert_eq!(text, "");
            assert_eq!(rest.as_deref(), Some("non-indented line"));
        }
    }

    #[test]
    fn test_tab_in_block_indent() {
        let ctx = ParseContext::new(None);
        let lines = "  ok\n\tbad".lines().map(|l| Ok::<_, io::Error>(l.to_string()));
        let mut scanner = Scanner::new(lines, &ctx);
        let header = BlockHeader::parse("|").unwrap();
        let err = read_block_scalar(&mut scanner, 0, header).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
