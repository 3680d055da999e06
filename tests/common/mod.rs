#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::Write;
use tempfile::NamedTempFile;

pub const MANIFEST: &str = "name, state, schemes\n\
visa, installed, visa\n\
bobpay, installed, visa amex\n\
bitcoin, disabled, bitcoin\n";

pub fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn write_json(value: &Value) -> NamedTempFile {
    write_temp(&value.to_string())
}

pub fn request(supported: &[&str], request_shipping: bool) -> Value {
    json!({
        "id": "order-1",
        "supportedInstruments": supported,
        "details": {
            "amount": 5500,
            "currencyCode": "USD",
            "countryCode": "US",
            "requestShipping": request_shipping
        }
    })
}

pub fn address() -> Value {
    json!({
        "street": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "postalCode": "62701",
        "country": "US"
    })
}

pub fn standard_and_express() -> Value {
    json!([
        { "label": "Standard", "identifier": "std", "description": "5-7 days", "amount": 0 },
        { "label": "Express", "identifier": "express", "description": "1 day", "amount": 1500 }
    ])
}

/// Parses JSON-lines stdout into events.
pub fn events(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}
