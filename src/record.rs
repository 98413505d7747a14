//! Persistent nested record with structural sharing.
//!
//! A [`Record`] never changes in place. [`Record::set`] copies the maps on the
//! way from the root to the written key and reuses every other subtree, so a
//! snapshot or an earlier render holding the old record keeps seeing the old
//! values.

use super::path::Path;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};

pub type Fields = BTreeMap<String, Node>;

/// A scalar or array leaf, or a nested mapping.
///
/// Objects are always held as [`Node::Map`]; a `Value` leaf is never an object.
/// [`Record::set`] rebuilds a hand-made object leaf as a map.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Leaf(Arc<Value>),
    Map(Arc<Fields>),
}

impl Node {
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Map(_) => None,
        }
    }
    pub fn as_map(&self) -> Option<&Arc<Fields>> {
        match self {
            Node::Map(fields) => Some(fields),
            Node::Leaf(_) => None,
        }
    }
    /// Same allocation, not just equal contents.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => Arc::ptr_eq(a, b),
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
    pub fn to_value(&self) -> Value {
        match self {
            Node::Leaf(value) => value.as_ref().clone(),
            Node::Map(fields) => fields_to_value(fields),
        }
    }
    fn deep_copy(&self) -> Node {
        match self {
            Node::Leaf(value) => Node::Leaf(Arc::new(value.as_ref().clone())),
            Node::Map(fields) => Node::Map(Arc::new(deep_copy_fields(fields))),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Node::Map(Arc::new(fields_from_map(map))),
            other => Node::Leaf(Arc::new(other)),
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Leaf(Arc::new(Value::String(value.to_owned())))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Leaf(Arc::new(Value::String(value)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    root: Arc<Fields>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &Arc<Fields> {
        &self.root
    }

    /// Resolve `path`. Missing or non-map intermediates yield `None`.
    pub fn get(&self, path: &Path) -> Option<&Node> {
        let (last, parents) = path.segments().split_last()?;
        let mut current = &self.root;
        for segment in parents {
            current = current.get(segment)?.as_map()?;
        }
        current.get(last)
    }

    pub fn value_at(&self, path: &Path) -> Option<Value> {
        self.get(path).map(Node::to_value)
    }

    pub fn str_at(&self, path: &Path) -> Option<&str> {
        self.get(path)?.as_leaf()?.as_str()
    }

    /// Return a new record with `value` written at `path`.
    ///
    /// Missing intermediates are created as empty maps. An intermediate that
    /// holds a scalar is replaced by a fresh map and logged.
    pub fn set(&self, path: &Path, value: impl Into<Node>) -> Record {
        let root = set_in(&self.root, path.segments(), normalize(value.into()), path);
        Record {
            root: Arc::new(root),
        }
    }

    /// A record holding only the listed paths, for partial-subtree updates.
    pub fn pick(&self, paths: &[Path]) -> Record {
        paths.iter().fold(Record::new(), |picked, path| match self.get(path) {
            Some(node) => picked.set(path, node.clone()),
            None => picked,
        })
    }

    /// Copy that shares no allocation with `self`.
    pub fn deep_copy(&self) -> Record {
        Record {
            root: Arc::new(deep_copy_fields(&self.root)),
        }
    }

    pub fn to_value(&self) -> Value {
        fields_to_value(&self.root)
    }
}

impl Record {
    /// Record from a JSON object. Any other value is handed back untouched.
    pub fn from_object(value: Value) -> Result<Record, Value> {
        match value {
            Value::Object(map) => Ok(Record {
                root: Arc::new(fields_from_map(map)),
            }),
            other => Err(other),
        }
    }
}

/// Lenient conversion for loading: anything but an object starts empty.
impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match Record::from_object(value) {
            Ok(record) => record,
            Err(Value::Null) => Record::new(),
            Err(other) => {
                warn!(found = %other, "record root is not an object, starting empty");
                Record::new()
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Record::from)
    }
}

fn normalize(node: Node) -> Node {
    match node {
        Node::Leaf(value) if value.is_object() => Node::from(value.as_ref().clone()),
        other => other,
    }
}

fn set_in(fields: &Fields, segments: &[String], value: Node, full_path: &Path) -> Fields {
    // shallow copy: children are Arc handles
    let mut copy = fields.clone();
    match segments {
        [] => {}
        [last] => {
            copy.insert(last.clone(), value);
        }
        [head, rest @ ..] => {
            let child = match fields.get(head) {
                Some(Node::Map(inner)) => set_in(inner, rest, value, full_path),
                Some(Node::Leaf(existing)) if !existing.is_null() => {
                    warn!(
                        path = %full_path,
                        segment = %head,
                        found = %existing,
                        "replacing non-object intermediate with an empty object"
                    );
                    set_in(&Fields::new(), rest, value, full_path)
                }
                _ => {
                    debug!(path = %full_path, segment = %head, "creating intermediate object");
                    set_in(&Fields::new(), rest, value, full_path)
                }
            };
            copy.insert(head.clone(), Node::Map(Arc::new(child)));
        }
    }
    copy
}

fn fields_from_map(map: Map<String, Value>) -> Fields {
    map.into_iter().map(|(k, v)| (k, Node::from(v))).collect()
}

fn fields_to_value(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_value()))
            .collect(),
    )
}

fn deep_copy_fields(fields: &Fields) -> Fields {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), v.deep_copy()))
        .collect()
}
