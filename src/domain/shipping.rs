use crate::domain::request::Amount;
use crate::error::{PaymentRequestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A postal address picked or entered by the user.
///
/// Addresses stay with shipping negotiation and the merchant; they are never
/// part of what an instrument receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    pub label: String,
    pub identifier: String,
    #[serde(default)]
    pub description: String,
    pub amount: Amount,
}

/// A non-empty, identifier-unique, ordered sequence of shipping options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShippingOptions(Vec<ShippingOption>);

impl ShippingOptions {
    pub fn new(options: Vec<ShippingOption>) -> Result<Self> {
        if options.is_empty() {
            return Err(PaymentRequestError::InvalidShippingOptions(
                "at least one shipping option is required".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(options.len());
        for option in &options {
            if option.identifier.is_empty() {
                return Err(PaymentRequestError::InvalidShippingOptions(format!(
                    "option '{}' has an empty identifier",
                    option.label
                )));
            }
            if !seen.insert(option.identifier.as_str()) {
                return Err(PaymentRequestError::InvalidShippingOptions(format!(
                    "duplicate identifier '{}'",
                    option.identifier
                )));
            }
        }

        Ok(Self(options))
    }

    pub fn get(&self, identifier: &str) -> Option<&ShippingOption> {
        self.0.iter().find(|o| o.identifier == identifier)
    }

    pub fn first(&self) -> &ShippingOption {
        // Non-empty by construction.
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options in the merchant's order.
    pub fn iter(&self) -> impl Iterator<Item = &ShippingOption> {
        self.0.iter()
    }
}

impl TryFrom<Vec<ShippingOption>> for ShippingOptions {
    type Error = PaymentRequestError;

    fn try_from(options: Vec<ShippingOption>) -> Result<Self> {
        Self::new(options)
    }
}
