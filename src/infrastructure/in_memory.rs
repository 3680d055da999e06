use crate::domain::instrument::InstrumentDescriptor;
use crate::domain::ports::InstrumentStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for instrument descriptors.
///
/// Uses `Arc<RwLock<HashMap<String, InstrumentDescriptor>>>` so clones share
/// the same installed set.
#[derive(Default, Clone)]
pub struct InMemoryInstrumentStore {
    instruments: Arc<RwLock<HashMap<String, InstrumentDescriptor>>>,
}

impl InMemoryInstrumentStore {
    /// Creates a new, empty in-memory instrument store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `descriptors`. Later entries win on
    /// duplicate names.
    pub fn with_instruments(descriptors: impl IntoIterator<Item = InstrumentDescriptor>) -> Self {
        let instruments = descriptors
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            instruments: Arc::new(RwLock::new(instruments)),
        }
    }
}

#[async_trait]
impl InstrumentStore for InMemoryInstrumentStore {
    async fn store(&self, descriptor: InstrumentDescriptor) -> Result<()> {
        let mut instruments = self.instruments.write().await;
        instruments.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<InstrumentDescriptor>> {
        let instruments = self.instruments.read().await;
        Ok(instruments.values().cloned().collect())
    }
}
