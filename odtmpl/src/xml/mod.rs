//! Minimal mutable XML tree for OpenDocument parts
//!
//! ODF parts are namespaced XML, but nothing here resolves namespaces: qualified names
//! such as `table:table-row` are kept as opaque strings, exactly as written. That is
//! all the promotion engine and the markdown converter need, and it keeps the serialized
//! output byte-compatible with the input for everything that was not rewritten.

pub mod dom;
pub mod parser;
pub mod serializer;

pub use dom::{Attribute, Document, NodeData, NodeId};
pub use parser::{parse, parse_bytes};
pub use serializer::{node_to_string, to_string};
