//! Read-only queries over a parsed tree.
//!
//! A [`NodeView`] either points at a node or is empty. Every navigation step
//! on an empty view, or one that does not resolve, yields another empty view,
//! so lookups chain without intermediate checks:
//!
//! ```
//! let doc = libminyaml::parse("server:\n  ports: [80, 443]\n").unwrap();
//! assert_eq!(doc.view().get("server").get("ports").at(1).to_i64(), Some(443));
//! assert_eq!(doc.view().at_path("server.ports[1]").to_i64(), Some(443));
//! assert_eq!(doc.view().value("server.timeout", 30u32), 30);
//! ```

use std::collections::HashMap;

use num_traits::{cast, NumCast};

use crate::node::Node;
use crate::value::Value;

/// A possibly-empty reference to a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeView<'a> {
    node: Option<&'a Node>,
}

impl<'a> NodeView<'a> {
    pub fn new(node: &'a Node) -> Self {
        Self { node: Some(node) }
    }

    /// A view that points at nothing.
    pub fn empty() -> Self {
        Self { node: None }
    }

    pub fn exists(&self) -> bool {
        self.node.is_some()
    }

    pub fn node(&self) -> Option<&'a Node> {
        self.node
    }

    pub fn is_scalar(&self) -> bool {
        self.node.is_some_and(Node::is_scalar)
    }

    pub fn is_map(&self) -> bool {
        self.node.is_some_and(Node::is_mapping)
    }

    pub fn is_seq(&self) -> bool {
        self.node.is_some_and(Node::is_sequence)
    }

    pub fn as_str(&self) -> Option<&'a str> {
        self.node.and_then(Node::as_str)
    }

    pub fn as_map(&self) -> Option<&'a HashMap<String, Node>> {
        self.node.and_then(Node::as_mapping)
    }

    pub fn as_seq(&self) -> Option<&'a [Node]> {
        self.node.and_then(Node::as_sequence)
    }

    /// Number of children; zero for scalars and empty views.
    pub fn len(&self) -> usize {
        self.node.map_or(0, Node::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mapping lookup by key.
    pub fn get(&self, key: &str) -> NodeView<'a> {
        Self {
            node: self.as_map().and_then(|map| map.get(key)),
        }
    }

    /// Sequence lookup by index.
    pub fn at(&self, index: usize) -> NodeView<'a> {
        Self {
            node: self.as_seq().and_then(|items| items.get(index)),
        }
    }

    /// Resolve a path such as `a.b[2].c` step by step.
    ///
    /// Keys are separated by dots and indices are written in brackets after
    /// a key (or after another index). Empty dot segments are skipped. A
    /// malformed index, a missing key, an out-of-range index, or a step into
    /// the wrong kind of node all give an empty view.
    pub fn at_path(&self, path: &str) -> NodeView<'a> {
        let mut cur = *self;
        for segment in path.split('.') {
            let (key, mut rest) = match segment.find('[') {
                Some(open) => segment.split_at(open),
                None => (segment, ""),
            };
            if !key.is_empty() {
                cur = cur.get(key);
            }
            while !rest.is_empty() {
                let Some((index, tail)) = parse_index(rest) else {
                    return Self::empty();
                };
                cur = cur.at(index);
                rest = tail;
            }
            if !cur.exists() {
                return Self::empty();
            }
        }
        cur
    }

    pub fn classify(&self) -> Option<Value> {
        self.node.and_then(Node::classify)
    }

    pub fn to_bool(&self) -> Option<bool> {
        self.node.and_then(Node::to_bool)
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.node.and_then(Node::to_i64)
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.node.and_then(Node::to_f64)
    }

    /// Look up `path` and read it as `T`, falling back to `default` when
    /// the path does not resolve or the node does not read as `T`.
    pub fn value<T: FromScalar>(&self, path: &str, default: T) -> T {
        self.at_path(path).read().unwrap_or(default)
    }

    /// Read this node as `T`.
    pub fn read<T: FromScalar>(&self) -> Option<T> {
        self.node.and_then(T::from_node)
    }
}

/// Parse a leading `[digits]`, returning the index and what follows.
fn parse_index(s: &str) -> Option<(usize, &str)> {
    let inner = s.strip_prefix('[')?;
    let close = inner.find(']')?;
    let digits = &inner[..close];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, &inner[close + 1..]))
}

/// Types a scalar node can be read as.
pub trait FromScalar: Sized {
    fn from_node(node: &Node) -> Option<Self>;
}

impl FromScalar for String {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_str().map(str::to_string)
    }
}

impl FromScalar for bool {
    fn from_node(node: &Node) -> Option<Self> {
        node.to_bool()
    }
}

macro_rules! from_scalar_int {
    ($($t:ty),*) => {
        $(
            impl FromScalar for $t {
                fn from_node(node: &Node) -> Option<Self> {
                    node.to_i64().and_then(cast::<i64, $t>)
                }
            }
        )*
    };
}

from_scalar_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromScalar for f64 {
    fn from_node(node: &Node) -> Option<Self> {
        node.to_f64()
    }
}

impl FromScalar for f32 {
    fn from_node(node: &Node) -> Option<Self> {
        node.to_f64().and_then(<f32 as NumCast>::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_path_lookup() {
        let doc = parse("\na:\n  b:\n    - 1\n    - 2\n  c: three\n    ").unwrap();
        let view = doc.view();
        assert_eq!(view.at_path("a.b[1]").to_i64(), Some(2));
        assert_eq!(view.at_path("a.c").as_str(), Some("three"));
        assert_eq!(view.value("a.d", 99), 99);
        assert!(view.at_path("a.b").is_seq());
        assert!(view.at_path("a").is_map());
    }

    #[test]
    fn test_failed_steps_give_empty_view() {
        let doc = parse("a:\n  b: [x, y]\n").unwrap();
        let view = doc.view();
        assert!(!view.at_path("a.b[2]").exists());
        assert!(!view.at_path("a.b.c").exists());
        assert!(!view.at_path("a[0]").exists());
        assert!(!view.at_path("a.b[x]").exists());
        assert!(!view.at_path("a.b[1").exists());
        assert!(!view.at_path("a.b[]").exists());
        assert!(!view.get("missing").get("deeper").at(3).exists());
        assert_eq!(view.get("missing").len(), 0);
    }

    #[test]
    fn test_path_edge_syntax() {
        let doc = parse("m:\n  - [a, b]\n  - [c]\n").unwrap();
        let view = doc.view();
        assert_eq!(view.at_path("m[0][1]").as_str(), Some("b"));
        assert_eq!(view.at_path(".m..[1][0].").as_str(), Some("c"));
        assert_eq!(view.at_path(""), view);
    }

    #[test]
    fn test_typed_values_with_defaults() {
        let doc = parse(
            "name: Test App\nversion: 1.2\nport: 8080\ndebug: yes\nnegative: -5\nempty:\nnothing: ~\n",
        )
        .unwrap();
        let view = doc.view();
        assert_eq!(view.value("name", String::new()), "Test App");
        assert_eq!(view.value("version", 0.0), 1.2);
        assert_eq!(view.value("port", 0u16), 8080);
        assert_eq!(view.value("port", 0u8), 0);
        assert_eq!(view.value("negative", 7u32), 7);
        assert_eq!(view.value("negative", 0i32), -5);
        assert!(view.value("debug", false));
        assert!(view.value("nothing", true));
        assert_eq!(view.value("nothing", 3i64), 3);
        assert_eq!(view.value("empty", String::from("d")), "d");
        assert_eq!(view.value("name", 1.5f32), 1.5);
    }

    #[test]
    fn test_read_collections() {
        let doc = parse("list: [1, 2]\nmap: {k: v}\n").unwrap();
        let view = doc.view();
        assert_eq!(view.get("list").as_seq().map(<[Node]>::len), Some(2));
        assert_eq!(view.get("map").as_map().map(HashMap::len), Some(1));
        assert_eq!(view.get("list").read::<String>(), None);
        assert_eq!(view.get("map").classify(), None);
        assert_eq!(view.at_path("list[0]").classify(), Some(Value::Integer(1)));
    }
}
