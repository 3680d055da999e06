use crate::domain::instrument::{InstrumentOutcome, InstrumentPayload};
use crate::domain::ports::PaymentInstrument;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// An instrument that answers every delegation with a preset outcome.
///
/// Used by the checkout script driver and in tests. Payloads it receives are
/// recorded so callers can inspect exactly what crossed the boundary.
#[derive(Clone)]
pub struct ScriptedInstrument {
    name: String,
    outcome: InstrumentOutcome,
    received: Arc<Mutex<Vec<InstrumentPayload>>>,
}

impl ScriptedInstrument {
    pub fn new(name: impl Into<String>, outcome: InstrumentOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            received: Arc::default(),
        }
    }

    /// Payloads delegated to this instrument so far.
    pub fn received(&self) -> Vec<InstrumentPayload> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl PaymentInstrument for ScriptedInstrument {
    fn name(&self) -> &str {
        &self.name
    }

    async fn request_payment(&self, payload: InstrumentPayload) -> InstrumentOutcome {
        debug!(instrument = %self.name, request = %payload.request_id, "scripted instrument invoked");
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(payload);
        self.outcome.clone()
    }
}
