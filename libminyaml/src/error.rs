//! Error types for minyaml parsing.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for minyaml parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying the source name for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Location of a whole line (1-based).
    pub fn line(&self, line: usize) -> Location {
        Location {
            line,
            column: None,
            source: self.filename.clone(),
        }
    }

    /// Location of a single column within a line (both 1-based).
    pub fn at(&self, line: usize, column: usize) -> Location {
        Location {
            line,
            column: Some(column),
            source: self.filename.clone(),
        }
    }
}

/// Position of a structural error in the source text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, when the error points at a specific character.
    pub column: Option<usize>,
    /// Source name, when the document came from a named file.
    pub source: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " at line {}", self.line)?;
        if let Some(column) = self.column {
            write!(f, ", column {}", column)?;
        }
        if let Some(source) = &self.source {
            write!(f, " of <{}>", source)?;
        }
        Ok(())
    }
}

/// Error type for minyaml parsing.
///
/// Every variant except [`ParseError::Io`] describes a structural problem in
/// the document and carries the [`Location`] it was detected at. Parsing
/// stops at the first error; there is no partial tree.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Tab character found where spaces expected.
    #[error("Tab not allowed in indentation (use spaces){0}")]
    TabInIndent(Location),

    /// A mapping line without a colon, outside of a scalar continuation.
    #[error("Missing colon in mapping entry \"{0}\"{1}")]
    MissingColon(String, Location),

    /// A mapping line whose key is empty.
    #[error("Empty mapping key{0}")]
    EmptyKey(Location),

    /// Unquoted value containing ": ", which reads like a nested key.
    #[error("Unquoted value contains \": \" (quote it to avoid ambiguity){0}")]
    AmbiguousColon(Location),

    /// Indentation increased where no block was opened.
    #[error("Unexpected indent{0}")]
    UnexpectedIndent(Location),

    /// Indentation decreased to a level that matches no open block.
    #[error("Indentation does not match any enclosing block{0}")]
    InconsistentDedent(Location),

    /// A sequence item inside a block that already holds mapping entries.
    #[error("Sequence item where a mapping entry was expected{0}")]
    UnexpectedSequenceItem(Location),

    /// A mapping entry inside a block that already holds sequence items.
    #[error("Mapping entry where a sequence item was expected{0}")]
    UnexpectedMappingEntry(Location),

    /// A non-empty flow mapping item without a colon.
    #[error("Flow mapping item \"{0}\" is missing a value{1}")]
    FlowMissingColon(String, Location),

    /// A flow mapping item whose key is empty.
    #[error("Empty key in flow mapping{0}")]
    FlowEmptyKey(Location),

    /// A flow collection that opens but never closes on its line.
    #[error("Unterminated flow {0}{1}")]
    UnterminatedFlow(&'static str, Location),

    /// A closing bracket or brace that does not match its opener.
    #[error("Unmatched \"{0}\" in flow collection{1}")]
    UnmatchedFlow(char, Location),

    /// The line source could not be opened or read.
    #[error("Cannot read {}: {source}", display_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "input".to_string(),
    }
}

impl ParseError {
    /// The location of a structural error, `None` for I/O failures.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::TabInIndent(loc)
            | ParseError::MissingColon(_, loc)
            | ParseError::EmptyKey(loc)
            | ParseError::AmbiguousColon(loc)
            | ParseError::UnexpectedIndent(loc)
            | ParseError::InconsistentDedent(loc)
            | ParseError::UnexpectedSequenceItem(loc)
            | ParseError::UnexpectedMappingEntry(loc)
            | ParseError::FlowMissingColon(_, loc)
            | ParseError::FlowEmptyKey(loc)
            | ParseError::UnterminatedFlow(_, loc)
            | ParseError::UnmatchedFlow(_, loc) => Some(loc),
            ParseError::Io { .. } => None,
        }
    }

    /// 1-based line number of a structural error.
    pub fn line(&self) -> Option<usize> {
        self.location().map(|loc| loc.line)
    }

    /// 1-based column of a structural error, when determinable.
    pub fn column(&self) -> Option<usize> {
        self.location().and_then(|loc| loc.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let ctx = ParseContext::new(None);
        assert_eq!(ctx.line(3).to_string(), " at line 3");
        assert_eq!(ctx.at(3, 7).to_string(), " at line 3, column 7");

        let named = ParseContext::new(Some("app.yml"));
        assert_eq!(named.at(1, 2).to_string(), " at line 1, column 2 of <app.yml>");
    }

    #[test]
    fn test_error_message() {
        let ctx = ParseContext::new(None);
        let err = ParseError::MissingColon("key value".to_string(), ctx.line(1));
        assert_eq!(
            err.to_string(),
            "Missing colon in mapping entry \"key value\" at line 1"
        );
        assert_eq!(err.line(), Some(1));
        assert_eq!(err.column(), None);
    }

    #[test]
    fn test_io_error_has_no_location() {
        let err = ParseError::Io {
            path: Some(PathBuf::from("missing.yml")),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.location().is_none());
        assert_eq!(err.to_string(), "Cannot read missing.yml: not found");
    }
}
