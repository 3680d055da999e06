//! Application layer orchestrating a payment request.
//!
//! `RequestCoordinator` drives one request through its state machine. It
//! consults the `InstrumentRegistry` at creation, delegates address handling
//! to `ShippingNegotiation`, and hands the final step to an
//! `InstrumentSession`.

pub mod coordinator;
pub mod registry;
pub mod session;
pub mod shipping;
