use crate::domain::shipping::{ShippingOption, ShippingOptions};
use crate::error::{PaymentRequestError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Represents a monetary amount in minor units of the request currency.
///
/// Amounts travel on the wire as integers (`1999` USD is 19.99 USD) so no
/// rounding can happen between merchant, user-agent and instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(minor_units: u64) -> Self {
        Self(minor_units)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Converts to major units using the currency's ISO 4217 exponent.
    pub fn to_major(&self, currency: &CurrencyCode) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), currency.minor_unit_exponent())
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// ISO 4217 alphabetic currency code, e.g. `USD`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(PaymentRequestError::InvalidRequest(format!(
                "currency code '{}' is not an ISO 4217 code",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal digits between minor and major units.
    pub fn minor_unit_exponent(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "PYG" | "XAF" | "XOF" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" | "IQD" | "LYD" => 3,
            _ => 2,
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = PaymentRequestError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ISO 3166-1 alpha-2 country code, e.g. `US`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code))
        } else {
            Err(PaymentRequestError::InvalidRequest(format!(
                "country code '{}' is not an ISO 3166 code",
                code
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = PaymentRequestError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Transaction details shared with the selected instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub amount: Amount,
    pub currency_code: CurrencyCode,
    pub country_code: CountryCode,
    #[serde(default)]
    pub request_shipping: bool,
    #[serde(default)]
    pub recurring_charge: bool,
}

/// The `details` member of a request creation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    #[serde(flatten)]
    pub transaction: TransactionDetails,
    /// Options the merchant can offer before any address is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_options: Option<Vec<ShippingOption>>,
}

/// A request creation message as issued by the merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestInit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub supported_instruments: Vec<String>,
    pub details: RequestDetails,
    #[serde(default)]
    pub scheme_data: BTreeMap<String, Value>,
}

/// A validated payment request.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    id: String,
    supported_instruments: Vec<String>,
    details: TransactionDetails,
    initial_shipping_options: Option<ShippingOptions>,
    scheme_data: BTreeMap<String, Value>,
}

impl PaymentRequest {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Instrument names in merchant priority order.
    pub fn supported_instruments(&self) -> &[String] {
        &self.supported_instruments
    }

    pub fn details(&self) -> &TransactionDetails {
        &self.details
    }

    pub fn initial_shipping_options(&self) -> Option<&ShippingOptions> {
        self.initial_shipping_options.as_ref()
    }

    pub fn scheme_data_for(&self, instrument: &str) -> Option<&Value> {
        self.scheme_data.get(instrument)
    }
}

impl TryFrom<PaymentRequestInit> for PaymentRequest {
    type Error = PaymentRequestError;

    fn try_from(init: PaymentRequestInit) -> Result<Self> {
        if init.supported_instruments.is_empty() {
            return Err(PaymentRequestError::InvalidRequest(
                "supportedInstruments must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &init.supported_instruments {
            if name.trim().is_empty() {
                return Err(PaymentRequestError::InvalidRequest(
                    "supportedInstruments contains an empty name".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(PaymentRequestError::InvalidRequest(format!(
                    "instrument '{}' is listed more than once",
                    name
                )));
            }
        }

        if let Some(unknown) = init
            .scheme_data
            .keys()
            .find(|key| !seen.contains(key.as_str()))
        {
            return Err(PaymentRequestError::InvalidRequest(format!(
                "schemeData references unsupported instrument '{}'",
                unknown
            )));
        }

        let transaction = init.details.transaction;
        let initial_shipping_options = match init.details.shipping_options {
            None => None,
            Some(_) if !transaction.request_shipping => {
                return Err(PaymentRequestError::InvalidRequest(
                    "shippingOptions supplied but requestShipping is false".to_string(),
                ));
            }
            Some(options) => Some(ShippingOptions::new(options).map_err(|e| {
                PaymentRequestError::InvalidRequest(format!("initial shipping options: {}", e))
            })?),
        };

        let id = match init.id {
            Some(id) if id.trim().is_empty() => {
                return Err(PaymentRequestError::InvalidRequest(
                    "request id must not be blank".to_string(),
                ));
            }
            Some(id) => id,
            None => format!("req-{}", Uuid::new_v4()),
        };

        Ok(Self {
            id,
            supported_instruments: init.supported_instruments,
            details: transaction,
            initial_shipping_options,
            scheme_data: init.scheme_data,
        })
    }
}
