use super::instrument::{InstrumentDescriptor, InstrumentOutcome, InstrumentPayload};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Installed-instrument state supplied by the installation flow.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    async fn store(&self, descriptor: InstrumentDescriptor) -> Result<()>;
    async fn get_all(&self) -> Result<Vec<InstrumentDescriptor>>;
}

/// A payment instrument able to fulfil one delegated request.
#[async_trait]
pub trait PaymentInstrument: Send + Sync {
    fn name(&self) -> &str;
    async fn request_payment(&self, payload: InstrumentPayload) -> InstrumentOutcome;
}

pub type InstrumentStoreRef = Arc<dyn InstrumentStore>;
pub type PaymentInstrumentBox = Box<dyn PaymentInstrument>;
