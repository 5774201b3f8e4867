//! # Hardware boundary module
//!
//! The motion control core never talks to peripherals directly. The main loop
//! acquires sensing through this interface at the start of each cycle and
//! applies the motor demands produced by `mov_ctrl` at the end of it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod sim;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Identifies one of the two driven wheels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract provided by the robot's motion peripherals.
pub trait MotionHw {
    /// Accumulated encoder pulse count for the given wheel.
    ///
    /// The count is monotonic while the wheel turns forwards and decreases
    /// when it turns backwards. Counter wraparound is not handled.
    fn encoder_count(&self, wheel: Wheel) -> i64;

    /// Free-running monotonic clock in microseconds.
    fn monotonic_us(&self) -> u64;

    /// Apply a normalised motor demand in `[-1, 1]` to the given wheel.
    ///
    /// Demands outside the range are clamped by the implementation.
    fn set_motor(&mut self, wheel: Wheel, dem: f64);
}
