//! # Time units

/// Hertz
pub type Hertz = fugit::HertzU32;

/// Microseconds
pub type Microseconds = fugit::MicrosDurationU32;
