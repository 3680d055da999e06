use crate::domain::request::PaymentRequestInit;
use crate::error::Result;
use std::io::Read;

/// Reads a merchant's request creation message.
///
/// Structural problems (missing fields, malformed codes) surface as
/// `PaymentRequestError::Json`, reported as `InvalidRequest`.
pub fn read_request<R: Read>(source: R) -> Result<PaymentRequestInit> {
    Ok(serde_json::from_reader(source)?)
}
