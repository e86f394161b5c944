//! Encoder: value graph -> flat [`Table`].
//!
//! Entries are assigned in first-encounter pre-order. A container's index is
//! reserved and recorded in the identity map before any of its children are
//! visited, so a child that refers back to it (directly or through a longer
//! cycle) resolves to the reserved index instead of walking the cycle again.
//! Scalars never enter the identity map: every scalar occurrence gets its own
//! entry.
//!
//! The walk uses an explicit stack of open containers. Each step takes the
//! next child of the innermost open container, assigns it an index (reserving
//! and opening it if it is a new container), and closes the container once
//! all children are numbered. This visits children depth-first and
//! left-to-right, exactly like the recursive formulation, without consuming
//! thread stack proportional to graph depth.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::CodecError;
use crate::graph::ObjectGraph;
use crate::table::{Entry, Index, Table};
use crate::value::{Object, ObjectId, Value};

/// Encodes `root` and everything reachable from it.
pub fn encode(graph: &ObjectGraph, root: &Value) -> Result<Table, CodecError> {
    Encoder::new(graph).encode(root)
}

/// Single-use encoding state over a borrowed graph.
///
/// A fresh identity map and entry list are created for every
/// [`encode`](Encoder::encode) call.
pub struct Encoder<'g> {
    graph: &'g ObjectGraph,
}

/// A container whose index is reserved but whose children are still being
/// numbered.
struct OpenContainer<'g> {
    slot: Index,
    object: &'g Object,
    next_child: usize,
    children: Entry,
}

impl<'g> Encoder<'g> {
    pub fn new(graph: &'g ObjectGraph) -> Self {
        Encoder { graph }
    }

    pub fn encode(&self, root: &Value) -> Result<Table, CodecError> {
        let mut walk = Walk {
            graph: self.graph,
            slots: Vec::new(),
            identities: HashMap::new(),
            open: Vec::new(),
        };

        let root_index = walk.visit(root)?;

        while let Some(top) = walk.open.last_mut() {
            let object: &'g Object = top.object;
            let Some((key, child)) = object.child(top.next_child) else {
                // All children numbered; the entry is final.
                if let Some(done) = walk.open.pop() {
                    walk.slots[done.slot] = Some(done.children);
                }
                continue;
            };
            top.next_child += 1;

            // `visit` only ever pushes, so the parent keeps its position.
            let parent = walk.open.len() - 1;
            let index = walk.visit(child)?;
            match (&mut walk.open[parent].children, key) {
                (Entry::Sequence(items), None) => items.push(index),
                (Entry::Record(fields), Some(key)) => {
                    fields.insert(key.to_owned(), index);
                }
                _ => unreachable!("child kind always matches its container"),
            }
        }

        // Every reserved slot is filled when its container closes.
        debug_assert!(walk.slots.iter().all(Option::is_some));
        let entries: Vec<Entry> = walk.slots.into_iter().flatten().collect();

        tracing::debug!(
            entries = entries.len(),
            containers = walk.identities.len(),
            root = root_index,
            "encoded object graph"
        );

        Ok(Table::new(root_index, entries))
    }
}

struct Walk<'g> {
    graph: &'g ObjectGraph,
    /// Reserved entries; `None` until the container is closed.
    slots: Vec<Option<Entry>>,
    /// Identity map: container -> reserved index.
    identities: HashMap<ObjectId, Index>,
    open: Vec<OpenContainer<'g>>,
}

impl<'g> Walk<'g> {
    /// Assigns an index to `value`, opening it if it is an unseen container.
    fn visit(&mut self, value: &Value) -> Result<Index, CodecError> {
        match value {
            Value::Scalar(scalar) => {
                let slot = self.slots.len();
                self.slots.push(Some(Entry::Scalar(scalar.clone())));
                Ok(slot)
            }
            Value::Object(id) => {
                if let Some(&slot) = self.identities.get(id) {
                    return Ok(slot);
                }
                let object = self.graph.object(*id)?;
                let slot = self.slots.len();
                self.slots.push(None);
                self.identities.insert(*id, slot);

                let children = match object {
                    Object::Sequence(items) => Entry::Sequence(Vec::with_capacity(items.len())),
                    Object::Record(fields) => {
                        Entry::Record(IndexMap::with_capacity(fields.len()))
                    }
                };
                self.open.push(OpenContainer {
                    slot,
                    object,
                    next_child: 0,
                    children,
                });
                Ok(slot)
            }
        }
    }
}
