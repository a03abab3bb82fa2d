//! Document tree.

use std::collections::HashMap;

use crate::scalar;
use crate::value::Value;
use crate::view::NodeView;

/// How a scalar was written in the source.
///
/// The style only matters when the tree is written back out; it never
/// changes what the scalar means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    /// Plain or quoted inline text.
    #[default]
    Plain,
    /// `|` block: line breaks kept.
    Literal,
    /// `>` block: single line breaks folded into spaces.
    Folded,
}

/// Raw scalar text with its presentation style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub style: ScalarStyle,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(HashMap<String, Node>),
}

impl Node {
    /// A plain scalar.
    pub fn plain(text: impl Into<String>) -> Self {
        Node::scalar(text, ScalarStyle::Plain)
    }

    /// A scalar with an explicit style.
    pub fn scalar(text: impl Into<String>, style: ScalarStyle) -> Self {
        Node::Scalar(Scalar {
            text: text.into(),
            style,
        })
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Node::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Scalar text, if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(&s.text),
            _ => None,
        }
    }

    /// Scalar style, if this is a scalar.
    pub fn style(&self) -> Option<ScalarStyle> {
        match self {
            Node::Scalar(s) => Some(s.style),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&HashMap<String, Node>> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Number of children of a collection; scalars have none.
    pub fn len(&self) -> usize {
        match self {
            Node::Scalar(_) => 0,
            Node::Sequence(items) => items.len(),
            Node::Mapping(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Infer the scalar's type; `None` for collections.
    pub fn classify(&self) -> Option<Value> {
        self.as_str().map(scalar::classify)
    }

    /// Boolean reading of a scalar.
    pub fn to_bool(&self) -> Option<bool> {
        self.as_str().and_then(scalar::to_bool)
    }

    /// Integer reading of a scalar.
    pub fn to_i64(&self) -> Option<i64> {
        self.as_str().and_then(scalar::to_i64)
    }

    /// Floating-point reading of a scalar.
    pub fn to_f64(&self) -> Option<f64> {
        self.as_str().and_then(scalar::to_f64)
    }
}

/// A parsed document. The root is always a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub(crate) fn new(root: Node) -> Self {
        debug_assert!(root.is_mapping());
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Read-only query view over the root.
    pub fn view(&self) -> NodeView<'_> {
        NodeView::new(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads_reject_collections() {
        let seq = Node::Sequence(vec![Node::plain("1")]);
        assert_eq!(seq.to_i64(), None);
        assert_eq!(seq.to_bool(), None);
        assert_eq!(seq.classify(), None);
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_style_does_not_change_meaning() {
        let literal = Node::scalar("42", ScalarStyle::Literal);
        assert_eq!(literal.to_i64(), Some(42));
        assert_eq!(literal.classify(), Some(Value::Integer(42)));
        assert_eq!(literal.style(), Some(ScalarStyle::Literal));
    }
}
