//! ObjectGraph: the arena that owns every container of a value graph.
//!
//! Containers live in a flat `Vec<Object>` and are referenced by
//! [`ObjectId`], which is their identity. Sharing and cycles are expressed by
//! storing the same id in several places, including inside the container
//! itself. The arena never frees slots, so an id stays valid for the life of
//! the graph.
//!
//! Building a cycle is a two-step affair: allocate the container empty, then
//! push or insert values that refer to it.
//!
//! ```ignore
//! let mut graph = ObjectGraph::new();
//! let x = graph.alloc_record();
//! graph.insert(x, "a", 1)?;
//! graph.insert(x, "b", x)?;
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::CodecError;
use crate::value::{Object, ObjectId, Value};

/// Arena of containers addressed by [`ObjectId`].
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: Vec<Object>,
}

impl ObjectGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of containers in the graph.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Allocates an empty sequence and returns its id.
    pub fn alloc_sequence(&mut self) -> ObjectId {
        self.alloc(Object::Sequence(Vec::new()))
    }

    /// Allocates an empty record and returns its id.
    pub fn alloc_record(&mut self) -> ObjectId {
        self.alloc(Object::Record(IndexMap::new()))
    }

    /// Allocates a sequence holding `items`.
    pub fn sequence<I, V>(&mut self, items: I) -> ObjectId
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.alloc(Object::Sequence(items.into_iter().map(Into::into).collect()))
    }

    /// Allocates a record holding `fields` in iteration order.
    pub fn record<I, K, V>(&mut self, fields: I) -> ObjectId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.alloc(Object::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    fn alloc(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Returns the container with the given id.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    /// Returns a mutable reference to the container with the given id.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(id.index())
    }

    /// Like [`get`](Self::get), but reports a missing id as an error.
    pub fn object(&self, id: ObjectId) -> Result<&Object, CodecError> {
        self.get(id).ok_or(CodecError::ObjectNotFound { id })
    }

    /// Appends a value to a sequence.
    pub fn push(&mut self, id: ObjectId, value: impl Into<Value>) -> Result<(), CodecError> {
        match self.get_mut(id) {
            Some(Object::Sequence(items)) => {
                items.push(value.into());
                Ok(())
            }
            Some(Object::Record(_)) => Err(CodecError::UnsupportedValueKind {
                kind: format!("push onto record ObjectId({})", id),
            }),
            None => Err(CodecError::ObjectNotFound { id }),
        }
    }

    /// Sets a record field. An existing key keeps its position.
    pub fn insert(
        &mut self,
        id: ObjectId,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), CodecError> {
        match self.get_mut(id) {
            Some(Object::Record(fields)) => {
                fields.insert(key.into(), value.into());
                Ok(())
            }
            Some(Object::Sequence(_)) => Err(CodecError::UnsupportedValueKind {
                kind: format!("keyed insert into sequence ObjectId({})", id),
            }),
            None => Err(CodecError::ObjectNotFound { id }),
        }
    }

    /// Iterates over all containers with their ids, in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, obj)| (ObjectId(i as u32), obj))
    }

    /// Returns true if `a` in `self` and `b` in `other` have the same
    /// structure and the same sharing topology.
    ///
    /// Scalars must be equal, containers must have the same kind, length and
    /// (for records) the same keys in the same order. Container identities
    /// must correspond one-to-one: if two positions under `a` reach the same
    /// container, the matching positions under `b` must reach the same
    /// container too, and vice versa. Cycles are handled.
    pub fn same_shape(&self, a: &Value, other: &ObjectGraph, b: &Value) -> bool {
        let mut forward: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut backward: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut pending: Vec<(Value, Value)> = vec![(a.clone(), b.clone())];

        while let Some((left, right)) = pending.pop() {
            match (&left, &right) {
                (Value::Scalar(l), Value::Scalar(r)) => {
                    if l != r {
                        return false;
                    }
                }
                (Value::Object(l), Value::Object(r)) => {
                    match (forward.get(l), backward.get(r)) {
                        (Some(mapped), _) if mapped != r => return false,
                        (_, Some(mapped)) if mapped != l => return false,
                        (Some(_), Some(_)) => continue,
                        _ => {}
                    }
                    forward.insert(*l, *r);
                    backward.insert(*r, *l);

                    let (Some(lobj), Some(robj)) = (self.get(*l), other.get(*r)) else {
                        return false;
                    };
                    match (lobj, robj) {
                        (Object::Sequence(ls), Object::Sequence(rs)) => {
                            if ls.len() != rs.len() {
                                return false;
                            }
                            pending.extend(ls.iter().cloned().zip(rs.iter().cloned()));
                        }
                        (Object::Record(lf), Object::Record(rf)) => {
                            if lf.len() != rf.len() || !lf.keys().eq(rf.keys()) {
                                return false;
                            }
                            pending.extend(lf.values().cloned().zip(rf.values().cloned()));
                        }
                        _ => return false,
                    }
                }
                _ => return false,
            }
        }
        true
    }
}
