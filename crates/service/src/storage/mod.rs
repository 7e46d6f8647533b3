//! Storage abstractions for service layer
//!
//! `RecordStore` is the read-all/append/find-by-id contract; the file-backed
//! and in-memory stores implement it interchangeably.

pub mod record_store;
pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileRecordStore;
pub use memory_store::MemoryRecordStore;
pub use record_store::{RecordStore, StoreHealth, StoreReadError};
