//! Error types for reftable-core.
//!
//! [`CodecError`] covers every failure mode of the encoder, the decoder, the
//! textual codec and the boundary reduction helpers. All variants are fatal
//! for the call that produced them: no partial table or graph is returned.

use thiserror::Error;

use crate::value::ObjectId;

/// Errors produced by encoding, decoding and table conversion.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A referenced table index has no corresponding entry.
    #[error("index out of range: {index} (table has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// An entry is neither a scalar, a list of indices, nor a string-keyed
    /// map of indices.
    #[error("malformed entry at index {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    /// The table as a whole cannot be decoded (empty, missing fields, ...).
    #[error("malformed table: {reason}")]
    MalformedTable { reason: String },

    /// A host value has no representation in the value model.
    #[error("unsupported value kind: {kind}")]
    UnsupportedValueKind { kind: String },

    /// A `Value::Object` refers to an id that the graph does not own.
    #[error("object not found: ObjectId({id})", id = id.0)]
    ObjectNotFound { id: ObjectId },

    /// A cycle was reached while exporting to a plain tree.
    #[error("cycle detected at ObjectId({id})", id = id.0)]
    CycleDetected { id: ObjectId },

    /// A plain tree export nests deeper than the export limit.
    #[error("nesting too deep: more than {limit} levels")]
    DepthLimitExceeded { limit: usize },

    /// JSON text could not be produced or parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_out_of_range_message() {
        let err = CodecError::IndexOutOfRange { index: 5, len: 1 };
        assert_eq!(err.to_string(), "index out of range: 5 (table has 1 entries)");
    }

    #[test]
    fn object_ids_render_like_core_ids() {
        let err = CodecError::CycleDetected { id: ObjectId(3) };
        assert_eq!(err.to_string(), "cycle detected at ObjectId(3)");
    }

    #[test]
    fn depth_limit_message() {
        let err = CodecError::DepthLimitExceeded { limit: 128 };
        assert_eq!(err.to_string(), "nesting too deep: more than 128 levels");
    }

    #[test]
    fn json_errors_convert() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CodecError = json_err.into();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
