//! Dataset upload and retrieval.

mod registry;
mod table;

pub use registry::DatasetRegistry;
pub use table::{ParsedTable, parse_table};
