//! minyaml: a practical, restricted subset of YAML for configuration files.
//!
//! Documents are indentation-structured mappings of scalars, sequences and
//! nested mappings, with literal (`|`) and folded (`>`) block scalars and
//! single-line flow collections (`[a, b]`, `{k: v}`). Anchors, tags,
//! multi-document streams and multi-line flow collections are not supported.
//!
//! # Parsing Pipeline
//!
//! The parser operates in three phases, all in a single pass:
//!
//! 1. **Scanner**: Pulls physical lines lazily, strips comments and line
//!    endings, skips blank lines, and measures indentation (tabs rejected).
//!
//! 2. **Indentation Stack Machine**: Classifies each line as a mapping entry,
//!    a sequence item, or a scalar continuation, and opens and closes blocks
//!    by indentation. Block scalars and flow collections are handed to their
//!    own sub-parsers.
//!
//! 3. **Materialization**: The finished draft tree becomes a [`Document`]
//!    whose root is always a mapping.
//!
//! Scalars keep their raw text. Types are inferred on demand with
//! [`classify`] or read through the typed accessors on [`Node`] and
//! [`NodeView`].

mod block;
mod emit;
mod error;
mod flow;
mod node;
mod parser;
mod scalar;
mod scanner;
mod value;
mod view;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

pub use emit::{outline, to_yaml_string, to_yaml_string_with, EmitOptions};
pub use error::{Location, ParseContext, ParseError, Result};
pub use node::{Document, Node, Scalar, ScalarStyle};
pub use scalar::classify;
pub use value::Value;
pub use view::{FromScalar, NodeView};

/// Parse a document from a string.
///
/// # Example
///
/// ```
/// use libminyaml::parse;
///
/// let doc = parse("scores: [85, 92.5, 78]").unwrap();
/// assert_eq!(doc.view().at_path("scores[1]").to_f64(), Some(92.5));
/// ```
pub fn parse(input: &str) -> Result<Document> {
    parse_with_filename(input, None)
}

/// Parse a document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Document> {
    let ctx = ParseContext::new(filename);
    let lines = input.lines().map(|line| Ok::<_, io::Error>(line.to_string()));
    parser::parse_lines(lines, &ctx).map(Document::new)
}

/// Parse a document from a buffered reader, one line at a time.
pub fn parse_reader<R: BufRead>(reader: R, filename: Option<&str>) -> Result<Document> {
    let ctx = ParseContext::new(filename);
    parser::parse_lines(reader.lines(), &ctx).map(Document::new)
}

/// Open and parse a file.
pub fn load_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: Some(PathBuf::from(path)),
        source,
    })?;
    let name = path.display().to_string();
    parse_reader(BufReader::new(file), Some(&name))
}
