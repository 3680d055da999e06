use crate::application::registry::InstrumentRegistry;
use crate::application::session::InstrumentSession;
use crate::application::shipping::ShippingNegotiation;
use crate::domain::event::MerchantEvent;
use crate::domain::instrument::{
    Annotation, InstrumentFailureCode, InstrumentPayload, InstrumentResponse, PaymentResponse,
    ResponseKind,
};
use crate::domain::luhn;
use crate::domain::ports::PaymentInstrument;
use crate::domain::request::{PaymentRequest, PaymentRequestInit};
use crate::domain::shipping::{Address, ShippingOption, ShippingOptions};
use crate::domain::state::RequestState;
use crate::error::{PaymentRequestError, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatorConfig {
    /// How long the merchant may take to answer a `shippingAddressChange`.
    /// `None` waits indefinitely.
    pub response_window: Option<Duration>,
}

/// Owns the lifecycle of a single payment request.
///
/// The coordinator is an explicit state machine. Every operation either
/// performs one legal transition or fails without touching state. Merchant
/// notifications are pushed to the channel returned by [`create`] and only
/// at defined transition points; terminal notifications are sent once.
///
/// [`create`]: RequestCoordinator::create
pub struct RequestCoordinator {
    request: PaymentRequest,
    state: RequestState,
    eligible: Vec<String>,
    selected: Option<String>,
    shipping: Option<ShippingNegotiation>,
    merchant: mpsc::UnboundedSender<MerchantEvent>,
}

impl RequestCoordinator {
    /// Validates the merchant's request and computes eligible instruments.
    ///
    /// # Arguments
    ///
    /// * `init` - The request creation message.
    /// * `registry` - Read-only view of installed instruments.
    /// * `config` - Expiration policy for merchant round-trips.
    pub async fn create(
        init: PaymentRequestInit,
        registry: &InstrumentRegistry,
        config: CoordinatorConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<MerchantEvent>)> {
        let request = PaymentRequest::try_from(init).inspect_err(|e| {
            warn!(error = %e, "rejected payment request");
        })?;

        let shipping = request.details().request_shipping.then(|| {
            ShippingNegotiation::new(
                request.initial_shipping_options().cloned(),
                config.response_window,
            )
        });

        let (merchant, events) = mpsc::unbounded_channel();
        let mut coordinator = Self {
            request,
            state: RequestState::Created,
            eligible: Vec::new(),
            selected: None,
            shipping,
            merchant,
        };
        info!(
            request = %coordinator.request.id(),
            amount = %coordinator.request.details().amount.to_major(&coordinator.request.details().currency_code),
            currency = %coordinator.request.details().currency_code,
            "payment request created"
        );

        coordinator.transition(RequestState::AwaitingSelection);
        match registry.eligible(coordinator.request.supported_instruments()).await {
            Ok(eligible) => {
                coordinator.eligible = eligible;
                Ok((coordinator, events))
            }
            Err(e @ PaymentRequestError::NoAvailablePaymentInstruments(_)) => {
                coordinator.transition(RequestState::Failed(e.kind()));
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub fn id(&self) -> &str {
        self.request.id()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn request(&self) -> &PaymentRequest {
        &self.request
    }

    /// Eligible instruments in merchant priority order.
    pub fn eligible_instruments(&self) -> &[String] {
        &self.eligible
    }

    pub fn selected_instrument(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn shipping_options(&self) -> Option<&ShippingOptions> {
        self.shipping.as_ref().and_then(ShippingNegotiation::options)
    }

    pub fn selected_shipping_option(&self) -> Option<&str> {
        self.shipping
            .as_ref()
            .and_then(ShippingNegotiation::selected_option)
    }

    /// Records the user's instrument choice. Only one choice per request.
    pub fn select_instrument(&mut self, name: &str) -> Result<()> {
        self.check_expiry()?;
        self.ensure("selectInstrument", |s| *s == RequestState::AwaitingSelection)?;

        if !self.eligible.iter().any(|e| e == name) {
            return Err(PaymentRequestError::InvalidRequest(format!(
                "instrument '{}' is not eligible for this request",
                name
            )));
        }

        info!(request = %self.request.id(), instrument = %name, "instrument selected");
        self.selected = Some(name.to_string());
        self.transition(RequestState::AwaitingInstrument);
        Ok(())
    }

    /// Records the user's address and notifies the merchant.
    ///
    /// The request stays in `ShippingPending` until the merchant answers
    /// with [`update_shipping_options`](Self::update_shipping_options).
    pub fn select_shipping_address(&mut self, address: Address) -> Result<()> {
        self.check_expiry()?;
        self.ensure("selectShippingAddress", |s| {
            matches!(
                s,
                RequestState::AwaitingInstrument | RequestState::ShippingPending
            )
        })?;

        let event = self.shipping_mut("selectShippingAddress")?.change_address(address);
        self.notify(event);
        self.transition(RequestState::ShippingPending);
        Ok(())
    }

    /// Applies the merchant's answer to a `shippingAddressChange`.
    ///
    /// A malformed update fails with `InvalidShippingOptions` and the request
    /// stays pending so the merchant can resubmit.
    pub fn update_shipping_options(&mut self, options: Vec<ShippingOption>) -> Result<()> {
        self.check_expiry()?;
        self.ensure("updateShippingOptions", |s| *s == RequestState::ShippingPending)?;

        self.shipping_mut("updateShippingOptions")?
            .update_options(options)?;
        self.transition(RequestState::AwaitingInstrument);
        Ok(())
    }

    pub fn select_shipping_option(&mut self, identifier: &str) -> Result<()> {
        self.check_expiry()?;
        self.ensure("selectShippingOption", |s| {
            *s == RequestState::AwaitingInstrument
        })?;

        let event = self
            .shipping_mut("selectShippingOption")?
            .select_option(identifier)?;
        self.notify(event);
        Ok(())
    }

    /// Builds the instrument session for the selected instrument.
    ///
    /// The payload carries transaction details, the instrument's own scheme
    /// data and the chosen shipping option identifier. Never the address.
    pub fn open_session(&mut self) -> Result<InstrumentSession> {
        self.check_expiry()?;
        self.ensure("openSession", |s| *s == RequestState::AwaitingInstrument)?;
        self.ensure_shipping_resolved()?;

        let instrument_name = self.selected_name("openSession")?;
        let payload = InstrumentPayload {
            request_id: self.request.id().to_string(),
            scheme_data: self.request.scheme_data_for(&instrument_name).cloned(),
            details: self.request.details().clone(),
            shipping_option: self.selected_shipping_option().map(str::to_string),
            instrument_name,
        };
        Ok(InstrumentSession::new(payload))
    }

    /// Runs an instrument session and settles the request with its outcome.
    pub async fn delegate(&mut self, instrument: &dyn PaymentInstrument) -> Result<PaymentResponse> {
        let session = self.open_session()?;
        debug!(
            request = %self.request.id(),
            instrument = %session.instrument_name(),
            shipping_option = ?session.payload().shipping_option,
            "instrument session opened"
        );
        match session.run(instrument).await {
            Ok(response) => self.finalize(response),
            Err(e @ PaymentRequestError::Instrument { .. }) => Err(self.terminate(e)),
            Err(e) => Err(e),
        }
    }

    /// Completes the request and emits the response to the merchant.
    ///
    /// Card numbers failing the Luhn check are annotated, not rejected.
    pub fn finalize(&mut self, response: InstrumentResponse) -> Result<PaymentResponse> {
        self.check_expiry()?;
        self.ensure("finalize", |s| *s == RequestState::AwaitingInstrument)?;
        self.ensure_shipping_resolved()?;

        let expected = self.selected_name("finalize")?;
        if response.instrument_name != expected {
            return Err(PaymentRequestError::InstrumentMismatch {
                expected,
                got: response.instrument_name,
            });
        }

        let mut annotations = Vec::new();
        if response.response_kind == ResponseKind::Finalize
            && let Some(number) = luhn::card_number(&response.details)
            && !luhn::is_valid(number)
        {
            warn!(request = %self.request.id(), "card number failed Luhn check");
            annotations.push(Annotation::LuhnCheckFailed);
        }

        let response = PaymentResponse {
            response,
            annotations,
        };
        self.notify(MerchantEvent::InstrumentResponse(response.clone()));
        self.transition(RequestState::Completed);
        Ok(response)
    }

    /// Fails the request with an instrument-reported code.
    ///
    /// Returns the error delivered to the merchant.
    pub fn fail(
        &mut self,
        code: InstrumentFailureCode,
        message: impl Into<String>,
    ) -> Result<PaymentRequestError> {
        self.check_expiry()?;
        self.ensure("fail", |s| *s == RequestState::AwaitingInstrument)?;
        Ok(self.terminate(PaymentRequestError::Instrument {
            code: code.into(),
            message: message.into(),
        }))
    }

    /// Cancels the request on behalf of the user.
    ///
    /// Legal from every non-terminal state; the merchant receives
    /// `UserCanceledRequest`. Cancelling twice is a no-op.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            RequestState::Cancelled => Ok(()),
            RequestState::Completed | RequestState::Failed(_) => {
                Err(self.invalid_state("cancel"))
            }
            _ => {
                info!(request = %self.request.id(), "request cancelled by user");
                self.notify(MerchantEvent::from(&PaymentRequestError::UserCanceledRequest));
                self.transition(RequestState::Cancelled);
                Ok(())
            }
        }
    }

    /// Fails the request with `Timeout` once the merchant's response window
    /// has elapsed.
    pub fn check_expiry(&mut self) -> Result<()> {
        if self.state != RequestState::ShippingPending {
            return Ok(());
        }
        let Some(shipping) = &self.shipping else {
            return Ok(());
        };
        if !shipping.is_overdue(Instant::now()) {
            return Ok(());
        }

        let window = shipping.response_window().unwrap_or_default();
        Err(self.terminate(PaymentRequestError::Timeout(window)))
    }

    /// When the pending merchant answer is due, if a response window applies.
    ///
    /// `None` outside `ShippingPending` or without a configured window.
    pub fn deadline(&self) -> Option<Instant> {
        if self.state != RequestState::ShippingPending {
            return None;
        }
        self.shipping.as_ref().and_then(ShippingNegotiation::deadline)
    }

    /// Resolves once the merchant's response window has elapsed, failing the
    /// request with `Timeout` and notifying the merchant.
    ///
    /// Never resolves while no deadline is pending, so it can sit in a
    /// `tokio::select!` next to the merchant's reply.
    pub async fn expired(&mut self) -> PaymentRequestError {
        loop {
            match self.deadline() {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            if let Err(e) = self.check_expiry() {
                return e;
            }
        }
    }

    fn ensure_shipping_resolved(&mut self) -> Result<()> {
        let unresolved = self.shipping.as_ref().is_some_and(|s| !s.is_resolved());
        if unresolved {
            return Err(self.terminate(PaymentRequestError::NoShippingOptionsProvided));
        }
        Ok(())
    }

    fn ensure(&self, operation: &'static str, allowed: impl Fn(&RequestState) -> bool) -> Result<()> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> PaymentRequestError {
        PaymentRequestError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }

    fn shipping_mut(&mut self, operation: &'static str) -> Result<&mut ShippingNegotiation> {
        let state = self.state.to_string();
        self.shipping
            .as_mut()
            .ok_or(PaymentRequestError::InvalidState { operation, state })
    }

    fn selected_name(&self, operation: &'static str) -> Result<String> {
        self.selected
            .clone()
            .ok_or_else(|| self.invalid_state(operation))
    }

    /// Moves to `Failed`, tells the merchant, and hands the error back.
    fn terminate(&mut self, err: PaymentRequestError) -> PaymentRequestError {
        warn!(request = %self.request.id(), error = %err, "payment request failed");
        self.notify(MerchantEvent::from(&err));
        self.transition(RequestState::Failed(err.kind()));
        err
    }

    fn transition(&mut self, next: RequestState) {
        debug!(request = %self.request.id(), from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn notify(&self, event: MerchantEvent) {
        // The merchant may have stopped listening; the state machine carries on.
        if self.merchant.send(event).is_err() {
            debug!(request = %self.request.id(), "merchant receiver dropped");
        }
    }
}
