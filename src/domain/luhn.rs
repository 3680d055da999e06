//! Structural check for card numbers.
//!
//! The result is advisory: a failing number is annotated on the response
//! but still delivered to the merchant.

use serde_json::Value;

const MIN_DIGITS: usize = 12;
const MAX_DIGITS: usize = 19;

/// Returns true if `number` passes the Luhn checksum.
///
/// Spaces and dashes are ignored. Anything else that is not a digit, or a
/// digit count outside 12..=19, fails.
pub fn is_valid(number: &str) -> bool {
    let mut digits = Vec::with_capacity(MAX_DIGITS);
    for c in number.chars() {
        match c {
            ' ' | '-' => continue,
            '0'..='9' => digits.push(c as u32 - '0' as u32),
            _ => return false,
        }
    }

    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Extracts `cardNumber` from a response payload, if present.
pub fn card_number(details: &Value) -> Option<&str> {
    details.get("cardNumber").and_then(Value::as_str)
}
