//! Boundary reduction between host data and the value model.
//!
//! Host types are reduced through serde: anything that implements
//! `Serialize` becomes a tree of scalars, sequences and records of its
//! serialized fields. Reduction never produces sharing, since serde has no
//! notion of identity; shared or cyclic graphs are built directly on an
//! [`ObjectGraph`].
//!
//! [`to_json`] goes the other way for acyclic graphs. Shared containers are
//! written out once per reference, and nesting is capped at
//! [`MAX_EXPORT_DEPTH`] so that the resulting tree stays safe to serialize
//! and drop. [`to_deserialize`] continues from there into any
//! `Deserialize` host type.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;
use crate::graph::ObjectGraph;
use crate::value::{Object, ObjectId, Scalar, Value};

/// Imports a plain JSON tree into `graph`.
pub fn from_json(graph: &mut ObjectGraph, json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Array(items) => {
            let id = graph.alloc_sequence();
            let values: Vec<Value> = items.iter().map(|item| from_json(graph, item)).collect();
            if let Some(Object::Sequence(slot)) = graph.get_mut(id) {
                *slot = values;
            }
            Value::Object(id)
        }
        serde_json::Value::Object(fields) => {
            let id = graph.alloc_record();
            let values: Vec<(String, Value)> = fields
                .iter()
                .map(|(key, item)| (key.clone(), from_json(graph, item)))
                .collect();
            if let Some(Object::Record(slot)) = graph.get_mut(id) {
                slot.extend(values);
            }
            Value::Object(id)
        }
        scalar => Scalar::from_json(scalar).map_or(Value::NULL, Value::Scalar),
    }
}

/// Reduces any serializable host value into `graph`.
///
/// Structs become records of their fields in declaration order. Values that
/// have no JSON form (maps with non-string keys, for instance) are rejected.
pub fn from_serialize<T: Serialize + ?Sized>(
    graph: &mut ObjectGraph,
    value: &T,
) -> Result<Value, CodecError> {
    let json = serde_json::to_value(value).map_err(|e| CodecError::UnsupportedValueKind {
        kind: e.to_string(),
    })?;
    Ok(from_json(graph, &json))
}

/// Deepest container nesting [`to_json`] will export, matching the nesting
/// serde_json accepts when parsing.
pub const MAX_EXPORT_DEPTH: usize = 128;

/// Exports `root` as a plain JSON tree.
///
/// Fails with `CycleDetected` if a container is reachable from itself, and
/// with `DepthLimitExceeded` if containers nest more than
/// [`MAX_EXPORT_DEPTH`] levels.
pub fn to_json(graph: &ObjectGraph, root: &Value) -> Result<serde_json::Value, CodecError> {
    let mut on_path = HashSet::new();
    export(graph, root, &mut on_path)
}

/// Exports `root` and deserializes it into a host type.
///
/// The host type sees the same tree [`to_json`] produces; a shape it does not
/// accept is reported as `UnsupportedValueKind`.
pub fn to_deserialize<T: DeserializeOwned>(
    graph: &ObjectGraph,
    root: &Value,
) -> Result<T, CodecError> {
    let json = to_json(graph, root)?;
    serde_json::from_value(json).map_err(|e| CodecError::UnsupportedValueKind {
        kind: e.to_string(),
    })
}

fn export(
    graph: &ObjectGraph,
    value: &Value,
    on_path: &mut HashSet<ObjectId>,
) -> Result<serde_json::Value, CodecError> {
    let id = match value {
        Value::Scalar(scalar) => return Ok(scalar.to_json()),
        Value::Object(id) => *id,
    };
    // `on_path` holds exactly the containers currently being exported.
    if on_path.len() >= MAX_EXPORT_DEPTH {
        return Err(CodecError::DepthLimitExceeded {
            limit: MAX_EXPORT_DEPTH,
        });
    }
    if !on_path.insert(id) {
        return Err(CodecError::CycleDetected { id });
    }

    let json = match graph.object(id)? {
        Object::Sequence(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|item| export(graph, item, on_path))
                .collect::<Result<_, _>>()?,
        ),
        Object::Record(fields) => serde_json::Value::Object(
            fields
                .iter()
                .map(|(key, item)| Ok((key.clone(), export(graph, item, on_path)?)))
                .collect::<Result<_, CodecError>>()?,
        ),
    };

    on_path.remove(&id);
    Ok(json)
}
