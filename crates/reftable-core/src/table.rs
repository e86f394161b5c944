//! The flat table format shared by the encoder, the decoder and the text codec.
//!
//! A [`Table`] is a root index plus a list of [`Entry`] slots. Containers are
//! flattened into entries that hold table indices in place of nested values,
//! so a cyclic graph becomes a finite, non-recursive list.
//!
//! On the wire a table looks like `{"root":0,"obj":[{"a":1},"x"]}`. The field
//! is also accepted under the name `entries` when reading.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::value::Scalar;

/// Zero-based position in [`Table::entries`].
pub type Index = usize;

/// One slot of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Entry {
    Scalar(Scalar),
    /// Sequence whose elements are replaced by their entry indices.
    Sequence(Vec<Index>),
    /// Record whose values are replaced by their entry indices, in the
    /// record's own key order.
    Record(IndexMap<String, Index>),
}

impl Entry {
    /// Iterates over every index this entry refers to.
    pub fn references(&self) -> Box<dyn Iterator<Item = Index> + '_> {
        match self {
            Entry::Scalar(_) => Box::new(std::iter::empty()),
            Entry::Sequence(items) => Box::new(items.iter().copied()),
            Entry::Record(fields) => Box::new(fields.values().copied()),
        }
    }

    /// Returns the `n`-th referenced index with its key, if any.
    pub fn child(&self, n: usize) -> Option<(Option<&str>, Index)> {
        match self {
            Entry::Scalar(_) => None,
            Entry::Sequence(items) => items.get(n).map(|&i| (None, i)),
            Entry::Record(fields) => fields.get_index(n).map(|(k, &i)| (Some(k.as_str()), i)),
        }
    }

    /// Converts one raw JSON entry, checking its shape.
    ///
    /// `index` is the entry's position, used only for error reporting.
    pub fn from_json(index: Index, value: &serde_json::Value) -> Result<Entry, CodecError> {
        match value {
            serde_json::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(pos, item)| {
                    as_index(item).ok_or_else(|| CodecError::MalformedEntry {
                        index,
                        reason: format!("element {} is not a table index: {}", pos, item),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Entry::Sequence),
            serde_json::Value::Object(fields) => fields
                .iter()
                .map(|(key, item)| {
                    as_index(item)
                        .map(|i| (key.clone(), i))
                        .ok_or_else(|| CodecError::MalformedEntry {
                            index,
                            reason: format!("field '{}' is not a table index: {}", key, item),
                        })
                })
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Entry::Record),
            serde_json::Value::Null => Ok(Entry::Scalar(Scalar::Null)),
            serde_json::Value::Bool(b) => Ok(Entry::Scalar(Scalar::Bool(*b))),
            serde_json::Value::Number(n) => Ok(Entry::Scalar(Scalar::Number(n.clone()))),
            serde_json::Value::String(s) => Ok(Entry::Scalar(Scalar::String(s.clone()))),
        }
    }
}

fn as_index(value: &serde_json::Value) -> Option<Index> {
    value.as_u64().and_then(|n| Index::try_from(n).ok())
}

/// Flat, index-addressed form of a value graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Index of the top-level value.
    pub root: Index,
    /// Entries in first-encounter pre-order.
    #[serde(rename = "obj", alias = "entries")]
    pub entries: Vec<Entry>,
}

/// Entry and reference counts of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub entries: usize,
    pub scalars: usize,
    pub sequences: usize,
    pub records: usize,
    /// Total number of indices held by container entries.
    pub references: usize,
    /// References pointing at the entry itself or at an earlier entry.
    pub back_references: usize,
}

impl Table {
    pub fn new(root: Index, entries: Vec<Entry>) -> Self {
        Table { root, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at `index`, or `IndexOutOfRange`.
    pub fn get(&self, index: Index) -> Result<&Entry, CodecError> {
        self.entries.get(index).ok_or(CodecError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Checks that the table is non-empty and every index is in range.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.entries.is_empty() {
            return Err(CodecError::MalformedTable {
                reason: "table has no entries".into(),
            });
        }
        self.get(self.root)?;
        for entry in &self.entries {
            for index in entry.references() {
                self.get(index)?;
            }
        }
        Ok(())
    }

    /// Counts entries by kind and references by direction.
    pub fn stats(&self) -> TableStats {
        let mut stats = TableStats {
            entries: self.entries.len(),
            ..TableStats::default()
        };
        for (position, entry) in self.entries.iter().enumerate() {
            match entry {
                Entry::Scalar(_) => stats.scalars += 1,
                Entry::Sequence(_) => stats.sequences += 1,
                Entry::Record(_) => stats.records += 1,
            }
            for index in entry.references() {
                stats.references += 1;
                if index <= position {
                    stats.back_references += 1;
                }
            }
        }
        stats
    }
}

/// Builds a table from a raw JSON tree, reporting malformed entries by
/// position instead of as generic deserialization failures.
impl TryFrom<serde_json::Value> for Table {
    type Error = CodecError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(mut fields) = value else {
            return Err(CodecError::MalformedTable {
                reason: "table must be a JSON object".into(),
            });
        };

        let root = match fields.get("root") {
            Some(root) => as_index(root).ok_or_else(|| CodecError::MalformedTable {
                reason: format!("root is not a table index: {}", root),
            })?,
            None => {
                return Err(CodecError::MalformedTable {
                    reason: "missing field 'root'".into(),
                })
            }
        };

        let raw = fields
            .remove("obj")
            .or_else(|| fields.remove("entries"))
            .ok_or_else(|| CodecError::MalformedTable {
                reason: "missing field 'obj'".into(),
            })?;
        let serde_json::Value::Array(raw) = raw else {
            return Err(CodecError::MalformedTable {
                reason: "'obj' must be an array".into(),
            });
        };

        let entries = raw
            .iter()
            .enumerate()
            .map(|(index, item)| Entry::from_json(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Table { root, entries })
    }
}
