//! Output helpers shared by the `substats` command paths.
#![allow(missing_docs)]

pub mod table;

pub use table::StreamingTable;
