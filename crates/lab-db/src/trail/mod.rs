//! JSONL trail writer.
//!
//! Every committed mutation is also appended to a per-actor JSONL file under
//! the configured trail directory.

pub mod writer;
