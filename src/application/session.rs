use crate::domain::instrument::{
    InstrumentOutcome, InstrumentPayload, InstrumentResponse, ResponseKind,
};
use crate::domain::ports::PaymentInstrument;
use crate::error::{PaymentRequestError, Result};
use tracing::{info, warn};

/// The hand-off of one request to the selected instrument.
///
/// A session is single-use: `run` consumes it, and nothing is retried.
#[derive(Debug)]
pub struct InstrumentSession {
    payload: InstrumentPayload,
}

impl InstrumentSession {
    pub(crate) fn new(payload: InstrumentPayload) -> Self {
        Self { payload }
    }

    pub fn instrument_name(&self) -> &str {
        &self.payload.instrument_name
    }

    /// The exact payload the instrument will receive.
    pub fn payload(&self) -> &InstrumentPayload {
        &self.payload
    }

    /// Delegates to `instrument` and waits for its single outcome.
    ///
    /// Instrument failures come back as `PaymentRequestError::Instrument` with
    /// the instrument's code untouched.
    pub async fn run(self, instrument: &dyn PaymentInstrument) -> Result<InstrumentResponse> {
        if instrument.name() != self.payload.instrument_name {
            return Err(PaymentRequestError::InstrumentMismatch {
                expected: self.payload.instrument_name,
                got: instrument.name().to_string(),
            });
        }

        let instrument_name = self.payload.instrument_name.clone();
        let request_id = self.payload.request_id.clone();
        info!(instrument = %instrument_name, request = %request_id, "delegating to instrument");

        match instrument.request_payment(self.payload).await {
            InstrumentOutcome::Response { details } => Ok(InstrumentResponse {
                instrument_name,
                details,
                response_kind: ResponseKind::Finalize,
            }),
            InstrumentOutcome::CompletedTransaction { proof } => Ok(InstrumentResponse {
                instrument_name,
                details: proof,
                response_kind: ResponseKind::CompletedTransaction,
            }),
            InstrumentOutcome::Failure { code, message } => {
                warn!(instrument = %instrument_name, request = %request_id, ?code, "instrument reported failure");
                Err(PaymentRequestError::Instrument {
                    code: code.into(),
                    message,
                })
            }
        }
    }
}
