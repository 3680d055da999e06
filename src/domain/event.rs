use crate::domain::instrument::PaymentResponse;
use crate::domain::shipping::Address;
use crate::error::{ErrorKind, PaymentRequestError};
use serde::Serialize;

/// Notifications delivered to the merchant at defined transition points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum MerchantEvent {
    #[serde(rename_all = "camelCase")]
    ShippingAddressChange { new_address: Address },
    ShippingOptionChange { identifier: String },
    InstrumentResponse(PaymentResponse),
    Error { kind: ErrorKind, message: String },
}

impl From<&PaymentRequestError> for MerchantEvent {
    fn from(err: &PaymentRequestError) -> Self {
        MerchantEvent::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
