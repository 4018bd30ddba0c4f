//! Domain models for record matching.

mod comparison;
mod patient;

pub use comparison::*;
pub use patient::*;
