/*!
 * Typed view over a serialized Lexical tree.
 *
 * Only the parts the patcher needs are typed: text leaves and nodes with
 * children. Everything else is carried through untouched, and every object
 * keeps its original key order so an unpatched tree serializes back to the
 * same JSON.
 */

use serde_json::{Map, Value};

use crate::errors::TreeError;

/// A node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leaf carrying text. `fields` is the node's full object; `text`
    /// overrides the value stored under the `text` key.
    Text {
        text: String,
        fields: Map<String, Value>,
    },
    /// Internal node with ordered children. `children` overrides the value
    /// stored under the `children` key of `fields`.
    Element {
        children: Vec<Node>,
        fields: Map<String, Value>,
    },
    /// Anything else (line breaks, images, cards...)
    Other(Value),
}

impl Node {
    /// Build a node from its JSON value
    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        let Value::Object(mut fields) = value else {
            return Ok(Node::Other(value));
        };

        if let Some(slot) = fields.get_mut("children") {
            let Value::Array(items) = slot.take() else {
                return Err(TreeError::Parse("`children` is not an array".to_string()));
            };
            let children = items
                .into_iter()
                .map(Node::from_value)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Node::Element { children, fields });
        }

        if fields.get("type").and_then(Value::as_str) == Some("text") {
            let text = match fields.get_mut("text").map(Value::take) {
                Some(Value::String(text)) => text,
                _ => return Err(TreeError::Parse("text node without a string `text`".to_string())),
            };
            return Ok(Node::Text { text, fields });
        }

        Ok(Node::Other(Value::Object(fields)))
    }

    /// JSON value of this node
    pub fn to_value(&self) -> Value {
        match self {
            Node::Text { text, fields } => {
                let mut fields = fields.clone();
                fields.insert("text".to_string(), Value::String(text.clone()));
                Value::Object(fields)
            }
            Node::Element { children, fields } => {
                let mut fields = fields.clone();
                let children = children.iter().map(Node::to_value).collect();
                fields.insert("children".to_string(), Value::Array(children));
                Value::Object(fields)
            }
            Node::Other(value) => value.clone(),
        }
    }

    /// Replace the first occurrence of `needle` in the first text leaf that
    /// contains it, visiting nodes in pre-order. Returns whether a
    /// substitution happened.
    pub fn replace_first(&mut self, needle: &str, replacement: &str) -> bool {
        match self {
            Node::Text { text, .. } => match text.find(needle) {
                Some(start) => {
                    text.replace_range(start..start + needle.len(), replacement);
                    true
                }
                None => false,
            },
            Node::Element { children, .. } => children
                .iter_mut()
                .any(|child| child.replace_first(needle, replacement)),
            Node::Other(_) => false,
        }
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Text { text, .. } => out.push(text),
            Node::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Node::Other(_) => {}
        }
    }
}

/// A parsed Lexical document: the top-level object plus its `root` node.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalTree {
    document: Map<String, Value>,
    root: Node,
}

impl LexicalTree {
    /// Parse a serialized Lexical document
    pub fn parse(raw: &str) -> Result<Self, TreeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| TreeError::Parse(e.to_string()))?;

        let Value::Object(mut document) = value else {
            return Err(TreeError::Parse("top level is not an object".to_string()));
        };

        let root = match document.get_mut("root").map(Value::take) {
            Some(root @ Value::Object(_)) => Node::from_value(root)?,
            _ => return Err(TreeError::Parse("missing `root` node".to_string())),
        };

        Ok(Self { document, root })
    }

    /// Root node
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// See [`Node::replace_first`]
    pub fn replace_first(&mut self, needle: &str, replacement: &str) -> bool {
        self.root.replace_first(needle, replacement)
    }

    /// Text of every leaf, in pre-order
    pub fn text_leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_text(&mut out);
        out
    }

    /// Serialize back to Lexical JSON
    pub fn serialize(&self) -> Result<String, TreeError> {
        let mut document = self.document.clone();
        document.insert("root".to_string(), self.root.to_value());
        serde_json::to_string(&Value::Object(document))
            .map_err(|e| TreeError::Structural(e.to_string()))
    }
}
