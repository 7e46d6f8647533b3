//! Service layer: record storage and upload handling behind the HTTP routes.
//! - `storage` holds the `RecordStore` contract and its file/in-memory implementations.
//! - `services` wraps a store with the operations the routes call.
//! - `uploads` derives safe names and writes blobs into the uploads directory.

pub mod errors;
pub mod record;
pub mod storage;
pub mod services;
pub mod uploads;

pub use record::Record;
