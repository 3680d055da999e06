//! Adapters for the domain ports.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod scripted;
