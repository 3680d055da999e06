use crate::domain::event::MerchantEvent;
use crate::domain::shipping::{Address, ShippingOption, ShippingOptions};
use crate::error::{PaymentRequestError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Address selection and the merchant round-trip for shipping options.
///
/// Owns the selected address for the lifetime of one request. The address is
/// only ever handed to the merchant through a `shippingAddressChange` event.
#[derive(Debug)]
pub struct ShippingNegotiation {
    address: Option<Address>,
    options: Option<ShippingOptions>,
    selected_option: Option<String>,
    resolved: bool,
    pending: bool,
    response_window: Option<Duration>,
    deadline: Option<Instant>,
}

impl ShippingNegotiation {
    pub fn new(initial_options: Option<ShippingOptions>, response_window: Option<Duration>) -> Self {
        let selected_option = initial_options
            .as_ref()
            .map(|options| options.first().identifier.clone());
        Self {
            address: None,
            options: initial_options,
            selected_option,
            resolved: false,
            pending: false,
            response_window,
            deadline: None,
        }
    }

    /// Records the user's address and suspends until the merchant answers.
    ///
    /// Returns the notification to forward to the merchant.
    pub fn change_address(&mut self, address: Address) -> MerchantEvent {
        let replaced = self.address.replace(address.clone()).is_some();
        self.pending = true;
        self.deadline = self.response_window.map(|window| Instant::now() + window);
        info!(replaced, country = %address.country, "shipping address selected");
        MerchantEvent::ShippingAddressChange {
            new_address: address,
        }
    }

    /// Applies a merchant update. Malformed updates leave everything as it was.
    pub fn update_options(&mut self, options: Vec<ShippingOption>) -> Result<()> {
        let options = ShippingOptions::new(options).inspect_err(|e| {
            warn!(error = %e, "rejected shipping options update");
        })?;

        let keep_selection = self
            .selected_option
            .as_deref()
            .is_some_and(|id| options.get(id).is_some());
        if !keep_selection {
            self.selected_option = Some(options.first().identifier.clone());
        }

        info!(count = options.len(), selected = ?self.selected_option, "shipping options updated");
        self.options = Some(options);
        self.resolved = true;
        self.pending = false;
        self.deadline = None;
        Ok(())
    }

    /// Records the user's choice among the current options.
    pub fn select_option(&mut self, identifier: &str) -> Result<MerchantEvent> {
        let known = self
            .options
            .as_ref()
            .is_some_and(|options| options.get(identifier).is_some());
        if !known {
            return Err(PaymentRequestError::InvalidShippingOptions(format!(
                "unknown shipping option '{}'",
                identifier
            )));
        }

        self.selected_option = Some(identifier.to_string());
        Ok(MerchantEvent::ShippingOptionChange {
            identifier: identifier.to_string(),
        })
    }

    pub fn options(&self) -> Option<&ShippingOptions> {
        self.options.as_ref()
    }

    pub fn selected_option(&self) -> Option<&str> {
        self.selected_option.as_deref()
    }

    /// True once the merchant has answered at least one address change with
    /// a valid options update.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn response_window(&self) -> Option<Duration> {
        self.response_window
    }

    /// When the merchant's answer to the last address change is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_overdue(&self, now: Instant) -> bool {
        self.pending && self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::Amount;

    fn address() -> Address {
        Address {
            street: "221B Baker Street".into(),
            city: "London".into(),
            state: String::new(),
            postal_code: "NW1 6XE".into(),
            country: "GB".into(),
        }
    }

    fn option(identifier: &str) -> ShippingOption {
        ShippingOption {
            label: identifier.into(),
            identifier: identifier.into(),
            description: String::new(),
            amount: Amount::new(500),
        }
    }

    #[test]
    fn test_address_change_suspends() {
        let mut negotiation = ShippingNegotiation::new(None, None);
        let event = negotiation.change_address(address());

        assert!(matches!(event, MerchantEvent::ShippingAddressChange { ref new_address } if new_address.city == "London"));
        assert!(negotiation.is_pending());
        assert!(!negotiation.is_resolved());
    }

    #[test]
    fn test_valid_update_resolves() {
        let mut negotiation = ShippingNegotiation::new(None, None);
        negotiation.change_address(address());
        negotiation
            .update_options(vec![option("std"), option("express")])
            .unwrap();

        assert!(negotiation.is_resolved());
        assert!(!negotiation.is_pending());
        assert_eq!(negotiation.selected_option(), Some("std"));
    }

    #[test]
    fn test_malformed_update_keeps_state() {
        let mut negotiation = ShippingNegotiation::new(None, None);
        negotiation.change_address(address());

        let err = negotiation.update_options(vec![]).unwrap_err();
        assert!(matches!(err, PaymentRequestError::InvalidShippingOptions(_)));
        assert!(negotiation.is_pending());
        assert!(!negotiation.is_resolved());
        assert!(negotiation.options().is_none());
    }

    #[test]
    fn test_selection_survives_update_when_still_offered() {
        let mut negotiation = ShippingNegotiation::new(None, None);
        negotiation.change_address(address());
        negotiation
            .update_options(vec![option("std"), option("express")])
            .unwrap();
        negotiation.select_option("express").unwrap();

        negotiation.change_address(address());
        negotiation
            .update_options(vec![option("express"), option("overnight")])
            .unwrap();
        assert_eq!(negotiation.selected_option(), Some("express"));

        negotiation.change_address(address());
        negotiation.update_options(vec![option("pickup")]).unwrap();
        assert_eq!(negotiation.selected_option(), Some("pickup"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut negotiation = ShippingNegotiation::new(None, None);
        assert!(negotiation.select_option("std").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let mut negotiation = ShippingNegotiation::new(None, Some(Duration::from_secs(30)));
        assert_eq!(negotiation.deadline(), None);
        let start = Instant::now();
        negotiation.change_address(address());

        assert_eq!(negotiation.deadline(), Some(start + Duration::from_secs(30)));
        assert!(!negotiation.is_overdue(Instant::now()));
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(negotiation.is_overdue(Instant::now()));

        negotiation.update_options(vec![option("std")]).unwrap();
        assert!(!negotiation.is_overdue(Instant::now()));
        assert_eq!(negotiation.deadline(), None);
    }
}
