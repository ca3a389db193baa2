//! Shared components - common types, errors, and unit conversion

pub mod errors;
pub mod types;
pub mod units;
