//! Key-value store adapters.

mod atomic_io;
mod json_file;
mod memory;

pub use json_file::JsonFileKeyValueStore;
pub use memory::InMemoryKeyValueStore;
