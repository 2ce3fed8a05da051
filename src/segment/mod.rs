//! In-memory segments and per-document value access
//!
//! # Architecture
//!
//! - `SegmentWriter`: buffers documents and builds one immutable segment
//! - `SegmentReader`: per-segment context (columns + tombstones) handed to collectors
//! - `DocValuesReader`: typed columns keyed by field name
//! - value sources: shared factories for per-segment, thread-confined value readers

mod types;
mod docvalues;
mod reader;
mod writer;
mod values;

pub use types::*;
pub use docvalues::*;
pub use reader::*;
pub use writer::*;
pub use values::*;
