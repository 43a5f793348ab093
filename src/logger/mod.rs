//! Diagnostics logging: JSONL append-only file plus a shared in-memory handle.

pub mod diagnostics;
pub mod jsonl;
