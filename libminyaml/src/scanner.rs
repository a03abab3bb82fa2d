//! Line cursor
//!
//! The scanner pulls physical lines from a lazy line source one at a time.
//! It performs:
//! - Line-ending normalization (a trailing `\r` is dropped)
//! - Comment stripping (`#` and everything after it, unconditionally)
//! - Blank line skipping
//! - Indentation counting and tab rejection
//!
//! The source is never restarted. A single line of pushback lets the parser
//! peek at the next significant line and lets the block scalar extractor
//! hand back the line that ended its block.

use std::io;
use std::path::PathBuf;

use crate::error::{ParseContext, ParseError, Result};

/// A physical line with its comment removed.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub text: String,
    /// 1-based line number.
    pub line_num: usize,
}

impl RawLine {
    /// Whether nothing but spaces and tabs remain on the line.
    pub fn is_blank(&self) -> bool {
        trim_blank(&self.text).is_empty()
    }
}

/// A significant (non-blank) line, measured.
#[derive(Debug, Clone)]
pub struct ScanLine {
    /// Content after indent, with trailing whitespace trimmed.
    pub content: String,
    /// Number of leading spaces.
    pub indent: usize,
    /// 1-based line number.
    pub line_num: usize,
}

impl ScanLine {
    /// Whether the line starts a sequence item (`-` alone or `- ...`).
    pub fn is_sequence_item(&self) -> bool {
        is_sequence_item(&self.content)
    }
}

/// Lazy cursor over a line source.
pub struct Scanner<'c, I> {
    lines: I,
    pending: Option<RawLine>,
    line_num: usize,
    ctx: &'c ParseContext,
}

impl<'c, I> Scanner<'c, I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, ctx: &'c ParseContext) -> Self {
        Self {
            lines,
            pending: None,
            line_num: 0,
            ctx,
        }
    }

    pub fn ctx(&self) -> &'c ParseContext {
        self.ctx
    }

    /// Number of physical lines pulled from the source so far.
    pub fn lines_read(&self) -> usize {
        self.line_num
    }

    /// Take the next physical line, blank or not.
    pub fn next_raw(&mut self) -> Result<Option<RawLine>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        let Some(next) = self.lines.next() else {
            return Ok(None);
        };
        let mut text = next.map_err(|source| ParseError::Io {
            path: self.ctx.filename.as_ref().map(PathBuf::from),
            source,
        })?;
        self.line_num += 1;

        if text.ends_with('\r') {
            text.pop();
        }
        if let Some(pos) = text.find('#') {
            text.truncate(pos);
            let kept = text.trim_end_matches([' ', '\t']).len();
            text.truncate(kept);
        }

        Ok(Some(RawLine {
            text,
            line_num: self.line_num,
        }))
    }

    /// Return a line to the cursor so the next read yields it again.
    pub fn push_back(&mut self, line: RawLine) {
        debug_assert!(self.pending.is_none(), "only one line of pushback");
        self.pending = Some(line);
    }

    /// Take the next significant line, skipping blank ones.
    pub fn next_line(&mut self) -> Result<Option<ScanLine>> {
        while let Some(raw) = self.next_raw()? {
            if raw.is_blank() {
                continue;
            }
            return self.measure(&raw).map(Some);
        }
        Ok(None)
    }

    /// Look at the next significant line without consuming it.
    ///
    /// Blank lines in front of it are consumed.
    pub fn peek_line(&mut self) -> Result<Option<ScanLine>> {
        while let Some(raw) = self.next_raw()? {
            if raw.is_blank() {
                continue;
            }
            let line = self.measure(&raw)?;
            self.push_back(raw);
            return Ok(Some(line));
        }
        Ok(None)
    }

    /// Count indentation of a non-blank line and split off its content.
    pub fn measure(&self, raw: &RawLine) -> Result<ScanLine> {
        let indent = leading_indent(&raw.text)
            .map_err(|col| ParseError::TabInIndent(self.ctx.at(raw.line_num, col)))?;
        Ok(ScanLine {
            content: trim_blank(&raw.text[indent..]).to_string(),
            indent,
            line_num: raw.line_num,
        })
    }
}

/// Count leading spaces, failing with the 1-based column of a tab that
/// appears before the first non-whitespace character.
pub fn leading_indent(line: &str) -> std::result::Result<usize, usize> {
    let mut indent = 0;
    for (i, b) in line.bytes().enumerate() {
        match b {
            b' ' => indent += 1,
            b'\t' => return Err(i + 1),
            _ => break,
        }
    }
    Ok(indent)
}

/// Trim spaces and tabs from both ends.
pub fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}

/// Whether line content starts a sequence item: `-` alone or `- ...`.
pub fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> impl Iterator<Item = io::Result<String>> + '_ {
        src.lines().map(|l| Ok(l.to_string()))
    }

    #[test]
    fn test_leading_indent() {
        assert_eq!(leading_indent(""), Ok(0));
        assert_eq!(leading_indent("hello"), Ok(0));
        assert_eq!(leading_indent("  hello"), Ok(2));
        assert_eq!(leading_indent("\thello"), Err(1));
        assert_eq!(leading_indent("  \thello"), Err(3));
        assert_eq!(leading_indent("a\tb"), Ok(0));
    }

    #[test]
    fn test_scan_skips_blank_and_comments() {
        let ctx = ParseContext::new(None);
        let mut scanner = Scanner::new(lines("# header\n\n  key: value # note\n"), &ctx);
        let line = scanner.next_line().unwrap().unwrap();
        assert_eq!(line.content, "key: value");
        assert_eq!(line.indent, 2);
        assert_eq!(line.line_num, 3);
        assert!(scanner.next_line().unwrap().is_none());
    }

    #[test]
    fn test_comment_stripping_is_naive() {
        let ctx = ParseContext::new(None);
        let mut scanner = Scanner::new(lines("color: \"#fff\""), &ctx);
        let line = scanner.next_line().unwrap().unwrap();
        assert_eq!(line.content, "color: \"");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let ctx = ParseContext::new(None);
        let mut scanner = Scanner::new(lines("a:\n\n  - x\n"), &ctx);
        scanner.next_line().unwrap();
        let peeked = scanner.peek_line().unwrap().unwrap();
        assert!(peeked.is_sequence_item());
        let next = scanner.next_line().unwrap().unwrap();
        assert_eq!(next.content, "- x");
        assert_eq!(next.line_num, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let ctx = ParseContext::new(None);
        let src: Vec<io::Result<String>> = vec![Ok("key: value\r".to_string())];
        let mut scanner = Scanner::new(src.into_iter(), &ctx);
        assert_eq!(scanner.next_line().unwrap().unwrap().content, "key: value");
    }

    #[test]
    fn test_tab_error_location() {
        let ctx = ParseContext::new(None);
        let mut scanner = Scanner::new(lines("key:\n\tvalue: 1"), &ctx);
        scanner.next_line().unwrap();
        let err = scanner.next_line().unwrap_err();
        assert!(matches!(err, ParseError::TabInIndent(_)));
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.column(), Some(1));
    }

    #[test]
    fn test_sequence_item_detection() {
        assert!(is_sequence_item("-"));
        assert!(is_sequence_item("- apple"));
        assert!(!is_sequence_item("-5"));
        assert!(!is_sequence_item("--"));
    }
}
