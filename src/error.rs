use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentRequestError>;

/// Error kinds as they appear on the merchant-facing error surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidRequest,
    NoAvailablePaymentInstruments,
    UserCanceledRequest,
    NoShippingOptionsProvided,
    InvalidShippingOptions,
    AuthFailure,
    InadequateAccountBalance,
    Timeout,
    InvalidState,
    InstrumentMismatch,
    Internal,
    /// Instrument-defined failure code, surfaced verbatim.
    #[serde(untagged)]
    Instrument(String),
}

impl ErrorKind {
    /// Parses a failure code, preferring a built-in kind when the name matches one.
    pub fn from_code(code: impl Into<String>) -> Self {
        let code = code.into();
        match code.as_str() {
            "InvalidRequest" => ErrorKind::InvalidRequest,
            "NoAvailablePaymentInstruments" => ErrorKind::NoAvailablePaymentInstruments,
            "UserCanceledRequest" => ErrorKind::UserCanceledRequest,
            "NoShippingOptionsProvided" => ErrorKind::NoShippingOptionsProvided,
            "InvalidShippingOptions" => ErrorKind::InvalidShippingOptions,
            "AuthFailure" => ErrorKind::AuthFailure,
            "InadequateAccountBalance" => ErrorKind::InadequateAccountBalance,
            "Timeout" => ErrorKind::Timeout,
            "InvalidState" => ErrorKind::InvalidState,
            "InstrumentMismatch" => ErrorKind::InstrumentMismatch,
            "Internal" => ErrorKind::Internal,
            _ => ErrorKind::Instrument(code),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidRequest => f.write_str("InvalidRequest"),
            ErrorKind::NoAvailablePaymentInstruments => {
                f.write_str("NoAvailablePaymentInstruments")
            }
            ErrorKind::UserCanceledRequest => f.write_str("UserCanceledRequest"),
            ErrorKind::NoShippingOptionsProvided => f.write_str("NoShippingOptionsProvided"),
            ErrorKind::InvalidShippingOptions => f.write_str("InvalidShippingOptions"),
            ErrorKind::AuthFailure => f.write_str("AuthFailure"),
            ErrorKind::InadequateAccountBalance => f.write_str("InadequateAccountBalance"),
            ErrorKind::Instrument(code) => f.write_str(code),
            ErrorKind::Timeout => f.write_str("Timeout"),
            ErrorKind::InvalidState => f.write_str("InvalidState"),
            ErrorKind::InstrumentMismatch => f.write_str("InstrumentMismatch"),
            ErrorKind::Internal => f.write_str("Internal"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PaymentRequestError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("No available payment instruments for {0:?}")]
    NoAvailablePaymentInstruments(Vec<String>),
    #[error("User canceled the request")]
    UserCanceledRequest,
    #[error("Shipping was requested but no shipping options were provided")]
    NoShippingOptionsProvided,
    #[error("Invalid shipping options: {0}")]
    InvalidShippingOptions(String),
    /// Failure reported by the payment instrument itself.
    #[error("Instrument failure {code}: {message}")]
    Instrument { code: ErrorKind, message: String },
    #[error("Merchant did not respond within {0:?}")]
    Timeout(std::time::Duration),
    #[error("Operation '{operation}' is not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
    #[error("Response from instrument '{got}' does not match selected instrument '{expected}'")]
    InstrumentMismatch { expected: String, got: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentRequestError {
    /// Maps the error onto the merchant-facing error surface.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentRequestError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            PaymentRequestError::NoAvailablePaymentInstruments(_) => {
                ErrorKind::NoAvailablePaymentInstruments
            }
            PaymentRequestError::UserCanceledRequest => ErrorKind::UserCanceledRequest,
            PaymentRequestError::NoShippingOptionsProvided => ErrorKind::NoShippingOptionsProvided,
            PaymentRequestError::InvalidShippingOptions(_) => ErrorKind::InvalidShippingOptions,
            PaymentRequestError::Instrument { code, .. } => code.clone(),
            PaymentRequestError::Timeout(_) => ErrorKind::Timeout,
            PaymentRequestError::InvalidState { .. } => ErrorKind::InvalidState,
            PaymentRequestError::InstrumentMismatch { .. } => ErrorKind::InstrumentMismatch,
            PaymentRequestError::Csv(_)
            | PaymentRequestError::Io(_)
            | PaymentRequestError::Storage(_) => ErrorKind::Internal,
            PaymentRequestError::Json(_) => ErrorKind::InvalidRequest,
        }
    }

    /// Whether the request survives this error.
    ///
    /// Only malformed shipping updates and caller misuse leave the request active.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaymentRequestError::InvalidShippingOptions(_)
                | PaymentRequestError::InvalidState { .. }
                | PaymentRequestError::InstrumentMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_code_is_surfaced_verbatim() {
        let err = PaymentRequestError::Instrument {
            code: ErrorKind::Instrument("CardExpired".to_string()),
            message: "card expired in 2019".to_string(),
        };
        assert_eq!(err.kind().to_string(), "CardExpired");
        assert_eq!(serde_json::to_string(&err.kind()).unwrap(), "\"CardExpired\"");
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::NoShippingOptionsProvided).unwrap();
        assert_eq!(json, "\"NoShippingOptionsProvided\"");

        let kind: ErrorKind = serde_json::from_str("\"AuthFailure\"").unwrap();
        assert_eq!(kind, ErrorKind::AuthFailure);

        let custom: ErrorKind = serde_json::from_str("\"VelocityLimit\"").unwrap();
        assert_eq!(custom, ErrorKind::Instrument("VelocityLimit".to_string()));
    }

    #[test]
    fn test_from_code_prefers_builtin_kinds() {
        assert_eq!(ErrorKind::from_code("Timeout"), ErrorKind::Timeout);
        assert_eq!(ErrorKind::from_code("AuthFailure"), ErrorKind::AuthFailure);
        assert_eq!(
            ErrorKind::from_code("CardExpired"),
            ErrorKind::Instrument("CardExpired".to_string())
        );
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(PaymentRequestError::InvalidShippingOptions("empty".into()).is_recoverable());
        assert!(!PaymentRequestError::NoShippingOptionsProvided.is_recoverable());
        assert!(!PaymentRequestError::UserCanceledRequest.is_recoverable());
    }
}
