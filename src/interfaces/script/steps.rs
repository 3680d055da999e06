use crate::domain::instrument::InstrumentOutcome;
use crate::domain::shipping::{Address, ShippingOption};
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;

/// One user, merchant or instrument action in a checkout script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum CheckoutStep {
    SelectInstrument { instrument: String },
    SelectShippingAddress { address: Address },
    UpdateShippingOptions { options: Vec<ShippingOption> },
    SelectShippingOption { identifier: String },
    /// The selected instrument answers with `outcome`.
    Respond { outcome: InstrumentOutcome },
    Cancel,
    /// Let time pass, e.g. to exercise the merchant response window.
    Wait { ms: u64 },
}

/// Reads a checkout script: a JSON array of steps.
pub fn read_steps<R: Read>(source: R) -> Result<Vec<CheckoutStep>> {
    Ok(serde_json::from_reader(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::InstrumentFailureCode;

    #[test]
    fn test_read_steps() {
        let data = r#"[
            {"action": "selectInstrument", "instrument": "visa"},
            {"action": "selectShippingAddress", "address": {
                "street": "1 Main St", "city": "Springfield", "state": "IL",
                "postalCode": "62701", "country": "US"
            }},
            {"action": "updateShippingOptions", "options": [
                {"label": "Standard", "identifier": "std", "description": "", "amount": 0}
            ]},
            {"action": "wait", "ms": 250},
            {"action": "respond", "outcome": {"type": "failure", "code": "AuthFailure"}},
            {"action": "cancel"}
        ]"#;

        let steps = read_steps(data.as_bytes()).unwrap();
        assert_eq!(steps.len(), 6);
        assert_eq!(
            steps[0],
            CheckoutStep::SelectInstrument {
                instrument: "visa".into()
            }
        );
        assert_eq!(steps[3], CheckoutStep::Wait { ms: 250 });
        assert!(matches!(
            &steps[4],
            CheckoutStep::Respond {
                outcome: InstrumentOutcome::Failure { code: InstrumentFailureCode::AuthFailure, .. }
            }
        ));
        assert_eq!(steps[5], CheckoutStep::Cancel);
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(read_steps(r#"[{"action": "refund"}]"#.as_bytes()).is_err());
    }
}
