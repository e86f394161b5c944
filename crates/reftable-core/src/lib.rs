//! Reference-preserving codec between object graphs and flat tables.
//!
//! A value graph of scalars, sequences and records, possibly with shared
//! sub-objects and cycles, is flattened into a [`Table`] whose entries refer
//! to each other by index, and rebuilt from one with the same sharing.
//!
//! # Modules
//!
//! - [`value`]: Scalar, Value, Object, ObjectId
//! - [`graph`]: ObjectGraph arena that owns containers
//! - [`table`]: Table and Entry wire format
//! - [`encode`]: graph -> table
//! - [`decode`]: table -> graph
//! - [`text`]: TextCodec trait, JSON codec, text entry points
//! - [`reduce`]: serde host values <-> graph values
//! - [`error`]: CodecError

pub mod decode;
pub mod encode;
pub mod error;
pub mod graph;
pub mod reduce;
pub mod table;
pub mod text;
pub mod value;

// Re-export key types for ergonomic use.
pub use decode::{decode, Decoded, Decoder};
pub use encode::{encode, Encoder};
pub use error::CodecError;
pub use graph::ObjectGraph;
pub use table::{Entry, Index, Table, TableStats};
pub use text::{decode_from_json, decode_from_text, encode_to_json, encode_to_text, JsonCodec, TextCodec};
pub use value::{Object, ObjectId, Scalar, Value};
