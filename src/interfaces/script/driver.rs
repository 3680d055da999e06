use super::steps::CheckoutStep;
use crate::application::coordinator::RequestCoordinator;
use crate::domain::ports::PaymentInstrumentBox;
use crate::domain::state::RequestState;
use crate::error::PaymentRequestError;
use crate::infrastructure::scripted::ScriptedInstrument;
use std::time::Duration;
use tracing::debug;

/// Result of running a checkout script.
#[derive(Debug)]
pub struct CheckoutReport {
    pub state: RequestState,
    /// Steps that failed, by zero-based index. Failed steps do not stop the
    /// script unless the request reached a terminal state.
    pub step_errors: Vec<(usize, PaymentRequestError)>,
    /// Steps never run because the request had already ended.
    pub skipped: usize,
}

/// Plays scripted user, merchant and instrument actions against one request.
pub struct CheckoutDriver {
    coordinator: RequestCoordinator,
}

impl CheckoutDriver {
    pub fn new(coordinator: RequestCoordinator) -> Self {
        Self { coordinator }
    }

    /// Runs every step in order and consumes the driver.
    ///
    /// Dropping the coordinator at the end closes the merchant channel, so a
    /// caller draining events sees the stream end.
    pub async fn run(mut self, steps: Vec<CheckoutStep>) -> CheckoutReport {
        let total = steps.len();
        let mut step_errors = Vec::new();
        let mut executed = 0;

        for (index, step) in steps.into_iter().enumerate() {
            if self.coordinator.state().is_terminal() {
                break;
            }
            executed += 1;
            debug!(request = %self.coordinator.id(), index, ?step, "running checkout step");
            if let Err(e) = self.apply(step).await {
                step_errors.push((index, e));
            }
        }

        CheckoutReport {
            state: self.coordinator.state().clone(),
            step_errors,
            skipped: total - executed,
        }
    }

    async fn apply(&mut self, step: CheckoutStep) -> Result<(), PaymentRequestError> {
        match step {
            CheckoutStep::SelectInstrument { instrument } => {
                self.coordinator.select_instrument(&instrument)
            }
            CheckoutStep::SelectShippingAddress { address } => {
                self.coordinator.select_shipping_address(address)
            }
            CheckoutStep::UpdateShippingOptions { options } => {
                self.coordinator.update_shipping_options(options)
            }
            CheckoutStep::SelectShippingOption { identifier } => {
                self.coordinator.select_shipping_option(&identifier)
            }
            CheckoutStep::Respond { outcome } => {
                let name = self
                    .coordinator
                    .selected_instrument()
                    .unwrap_or_default()
                    .to_string();
                let instrument: PaymentInstrumentBox =
                    Box::new(ScriptedInstrument::new(name, outcome));
                self.coordinator.delegate(instrument.as_ref()).await.map(|_| ())
            }
            CheckoutStep::Cancel => self.coordinator.cancel(),
            CheckoutStep::Wait { ms } => {
                // A silent merchant times out at its deadline, not at the end of the wait.
                let expired = tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(ms)) => None,
                    e = self.coordinator.expired() => Some(e),
                };
                match expired {
                    Some(e) => Err(e),
                    None => self.coordinator.check_expiry(),
                }
            }
        }
    }
}
