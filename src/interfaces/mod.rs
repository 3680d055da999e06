//! Outer surfaces: manifest and message readers, the event writer and the
//! scripted checkout driver used by the CLI.

pub mod csv;
pub mod json;
pub mod script;
