//! Cache implementations
//!
//! - `FileCache`: one JSON file per key, expired by modification time

mod file_cache;

pub use file_cache::FileCache;
