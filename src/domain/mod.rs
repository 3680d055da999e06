//! Domain model of the payment request protocol.
//!
//! Value objects, the request state enum, merchant events and the ports the
//! application layer is written against. Nothing in here performs I/O.

pub mod event;
pub mod instrument;
pub mod luhn;
pub mod ports;
pub mod request;
pub mod shipping;
pub mod state;
