//! Motion and collision handling for simulated objects.

pub mod collision;
pub mod motion;

pub use motion::Motion;

/// Floating point type used for physics simulation.
#[allow(non_camel_case_types)]
pub type fph = f64;
