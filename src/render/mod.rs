//! Incremental table rendering: page-sized materialization into a sink.

pub mod buffer;
pub mod format;
pub mod incremental;

pub use buffer::TableBuffer;
pub use format::{DisplayRow, RowFormatter, Viewport};
pub use incremental::{GrowOutcome, IncrementalRenderer, PAGE_SIZE, RenderSink};
