//! Defense - armor and magic resist mitigation

mod resistance;

pub use resistance::{effective_resistance, mitigate};

/// Defense calculation constants
pub mod constants {
    /// Numerator and offset of the resist curve: `raw × 100 / (100 + resist)`
    pub const RESIST_SCALE: f64 = 100.0;

    /// Lowest resist value fed into the curve by default.
    ///
    /// The curve has a pole at -100; anything at or below it would heal or
    /// divide by zero.
    pub const DEFAULT_MIN_RESIST: f64 = -99.0;
}
