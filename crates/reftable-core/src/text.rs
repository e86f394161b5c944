//! Textual codecs for tables and the combined graph <-> text entry points.
//!
//! [`TextCodec`] is the seam between the graph codec and a concrete text
//! syntax. [`JsonCodec`] is the provided implementation. Parsing goes through
//! an untyped JSON tree first so that shape errors come back as
//! `MalformedEntry`/`MalformedTable` with a position, rather than as an opaque
//! deserialization failure.

use crate::decode::{decode, Decoded};
use crate::encode::encode;
use crate::error::CodecError;
use crate::graph::ObjectGraph;
use crate::table::Table;
use crate::value::Value;

/// Converts tables to text and back without loss.
pub trait TextCodec {
    fn encode(&self, table: &Table) -> Result<String, CodecError>;
    fn decode(&self, text: &str) -> Result<Table, CodecError>;
}

/// JSON text codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec {
    /// Emit indented output instead of a single line.
    pub pretty: bool,
}

impl JsonCodec {
    pub fn compact() -> Self {
        JsonCodec { pretty: false }
    }

    pub fn pretty() -> Self {
        JsonCodec { pretty: true }
    }
}

impl TextCodec for JsonCodec {
    fn encode(&self, table: &Table) -> Result<String, CodecError> {
        let text = if self.pretty {
            serde_json::to_string_pretty(table)?
        } else {
            serde_json::to_string(table)?
        };
        Ok(text)
    }

    fn decode(&self, text: &str) -> Result<Table, CodecError> {
        let raw: serde_json::Value = serde_json::from_str(text)?;
        Table::try_from(raw)
    }
}

/// Encodes a graph and renders the table with `codec`.
pub fn encode_to_text<C: TextCodec + ?Sized>(
    codec: &C,
    graph: &ObjectGraph,
    root: &Value,
) -> Result<String, CodecError> {
    codec.encode(&encode(graph, root)?)
}

/// Parses a table with `codec` and decodes it.
pub fn decode_from_text<C: TextCodec + ?Sized>(
    codec: &C,
    text: &str,
) -> Result<Decoded, CodecError> {
    decode(&codec.decode(text)?)
}

/// [`encode_to_text`] with compact JSON.
pub fn encode_to_json(graph: &ObjectGraph, root: &Value) -> Result<String, CodecError> {
    encode_to_text(&JsonCodec::compact(), graph, root)
}

/// [`decode_from_text`] with JSON.
pub fn decode_from_json(text: &str) -> Result<Decoded, CodecError> {
    decode_from_text(&JsonCodec::default(), text)
}
