//! Decoder: flat [`Table`] -> value graph.
//!
//! Each table index is resolved at most once. When a container entry is
//! first reached its (empty) container is allocated and stored in the index
//! map before any child is resolved, so every later reference to the same
//! index, including references from inside its own subtree, yields the same
//! [`ObjectId`]. That is what rebuilds shared sub-objects and cycles.
//!
//! Like the encoder, the walk keeps an explicit stack of containers whose
//! children are still being filled in.

use crate::error::CodecError;
use crate::graph::ObjectGraph;
use crate::table::{Entry, Index, Table};
use crate::value::{ObjectId, Value};

/// A decoded graph together with its top-level value.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub graph: ObjectGraph,
    pub root: Value,
}

/// Decodes a table into a fresh graph.
pub fn decode(table: &Table) -> Result<Decoded, CodecError> {
    Decoder::new(table).decode()
}

/// Single-use decoding state over a borrowed table.
pub struct Decoder<'t> {
    table: &'t Table,
}

struct OpenContainer {
    index: Index,
    object: ObjectId,
    next_child: usize,
}

struct Walk<'t> {
    table: &'t Table,
    graph: ObjectGraph,
    /// Index map: table index -> reconstructed value.
    resolved: Vec<Option<Value>>,
    open: Vec<OpenContainer>,
}

impl<'t> Decoder<'t> {
    pub fn new(table: &'t Table) -> Self {
        Decoder { table }
    }

    pub fn decode(&self) -> Result<Decoded, CodecError> {
        let table = self.table;
        if table.is_empty() {
            return Err(CodecError::MalformedTable {
                reason: "table has no entries".into(),
            });
        }

        let mut walk = Walk {
            table,
            graph: ObjectGraph::new(),
            resolved: vec![None; table.len()],
            open: Vec::new(),
        };

        let root = walk.resolve(table.root)?;

        while let Some(top) = walk.open.last_mut() {
            let entry = &table.entries[top.index];
            let Some((key, child)) = entry.child(top.next_child) else {
                walk.open.pop();
                continue;
            };
            top.next_child += 1;
            let parent = top.object;

            let value = walk.resolve(child)?;
            match key {
                Some(key) => walk.graph.insert(parent, key, value)?,
                None => walk.graph.push(parent, value)?,
            }
        }

        tracing::debug!(
            entries = table.len(),
            containers = walk.graph.len(),
            "decoded object graph"
        );

        Ok(Decoded {
            graph: walk.graph,
            root,
        })
    }
}

impl Walk<'_> {
    /// Returns the value for `index`, allocating and opening its container
    /// on first reach.
    fn resolve(&mut self, index: Index) -> Result<Value, CodecError> {
        let entry = self.table.get(index)?;
        if let Some(value) = &self.resolved[index] {
            return Ok(value.clone());
        }

        let value = match entry {
            Entry::Scalar(scalar) => Value::Scalar(scalar.clone()),
            Entry::Sequence(_) | Entry::Record(_) => {
                let object = match entry {
                    Entry::Sequence(_) => self.graph.alloc_sequence(),
                    _ => self.graph.alloc_record(),
                };
                self.open.push(OpenContainer {
                    index,
                    object,
                    next_child: 0,
                });
                Value::Object(object)
            }
        };
        self.resolved[index] = Some(value.clone());
        Ok(value)
    }
}
