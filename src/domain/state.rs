use crate::error::ErrorKind;
use serde::Serialize;
use std::fmt;

/// Lifecycle of a single payment request.
///
/// `Created → AwaitingSelection → AwaitingInstrument ⇄ ShippingPending`, then
/// one of the terminal states. Terminal states are never left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestState {
    Created,
    AwaitingSelection,
    AwaitingInstrument,
    ShippingPending,
    Completed,
    Cancelled,
    Failed(ErrorKind),
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Completed | RequestState::Cancelled | RequestState::Failed(_)
        )
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::Created => f.write_str("Created"),
            RequestState::AwaitingSelection => f.write_str("AwaitingSelection"),
            RequestState::AwaitingInstrument => f.write_str("AwaitingInstrument"),
            RequestState::ShippingPending => f.write_str("ShippingPending"),
            RequestState::Completed => f.write_str("Completed"),
            RequestState::Cancelled => f.write_str("Cancelled"),
            RequestState::Failed(kind) => write!(f, "Failed({})", kind),
        }
    }
}
