use crate::domain::request::TransactionDetails;
use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallState {
    #[default]
    Installed,
    Disabled,
}

/// Describes a payment instrument known to the user-agent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct InstrumentDescriptor {
    /// Unique key, matched against the merchant's `supportedInstruments`.
    pub name: String,
    pub state: InstallState,
    /// Schemes the instrument claims to implement. Not verified.
    #[serde(default)]
    pub schemes: Vec<String>,
}

impl InstrumentDescriptor {
    pub fn new(name: impl Into<String>, schemes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            state: InstallState::Installed,
            schemes,
        }
    }

    pub fn is_installed(&self) -> bool {
        self.state == InstallState::Installed
    }
}

/// What the selected instrument receives.
///
/// Carries no shipping address.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentPayload {
    pub request_id: String,
    pub instrument_name: String,
    pub details: TransactionDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option: Option<String>,
}

/// Failure codes an instrument may report.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum InstrumentFailureCode {
    AuthFailure,
    InadequateAccountBalance,
    #[serde(untagged)]
    Other(String),
}

impl From<InstrumentFailureCode> for ErrorKind {
    fn from(code: InstrumentFailureCode) -> Self {
        match code {
            InstrumentFailureCode::AuthFailure => ErrorKind::AuthFailure,
            InstrumentFailureCode::InadequateAccountBalance => ErrorKind::InadequateAccountBalance,
            InstrumentFailureCode::Other(code) => ErrorKind::from_code(code),
        }
    }
}

/// The single result an instrument produces for a session.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InstrumentOutcome {
    /// Finalize data (card number, token, ...) for the merchant to process.
    Response { details: Value },
    /// Proof that the instrument already completed the transaction.
    CompletedTransaction { proof: Value },
    Failure {
        code: InstrumentFailureCode,
        #[serde(default)]
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum ResponseKind {
    #[default]
    Finalize,
    CompletedTransaction,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResponse {
    pub instrument_name: String,
    pub details: Value,
    #[serde(default)]
    pub response_kind: ResponseKind,
}

/// Advisory flags attached to a delivered response. They never block delivery.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub enum Annotation {
    LuhnCheckFailed,
}

/// The terminal artifact handed to the merchant.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub response: InstrumentResponse,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}
