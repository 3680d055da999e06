pub mod driver;
pub mod steps;
