use crate::domain::instrument::InstrumentDescriptor;
use crate::domain::ports::InstrumentStore;
use crate::error::{PaymentRequestError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing instrument descriptors.
pub const CF_INSTRUMENTS: &str = "instruments";

impl From<rocksdb::Error> for PaymentRequestError {
    fn from(e: rocksdb::Error) -> Self {
        PaymentRequestError::Storage(Box::new(e))
    }
}

/// A persistent instrument store backed by RocksDB.
///
/// Descriptors are stored as JSON keyed by instrument name, so installed
/// instruments survive across runs.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBInstrumentStore {
    db: Arc<DB>,
}

impl RocksDBInstrumentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the "instruments" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_instruments = ColumnFamilyDescriptor::new(CF_INSTRUMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_instruments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn missing_cf() -> PaymentRequestError {
        PaymentRequestError::Storage(Box::new(std::io::Error::other(
            "Instruments column family not found",
        )))
    }
}

#[async_trait]
impl InstrumentStore for RocksDBInstrumentStore {
    async fn store(&self, descriptor: InstrumentDescriptor) -> Result<()> {
        let cf = self.db.cf_handle(CF_INSTRUMENTS).ok_or_else(Self::missing_cf)?;
        let value = serde_json::to_vec(&descriptor)?;
        self.db.put_cf(&cf, descriptor.name.as_bytes(), value)?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<InstrumentDescriptor>> {
        let cf = self.db.cf_handle(CF_INSTRUMENTS).ok_or_else(Self::missing_cf)?;

        let mut descriptors = Vec::new();
        for item in self.db.iterator_cf(&cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            descriptors.push(serde_json::from_slice(&value)?);
        }

        Ok(descriptors)
    }
}
