//! Library components of the motion control executable.
//!
//! The library is split into two trees:
//!
//! - [`hw`]: the hardware boundary, a trait describing the encoder, clock and
//!   motor peripherals plus a deterministic simulated implementation.
//! - [`mov_ctrl`]: the motion control module itself, which turns body
//!   velocity setpoints into per-wheel motor demands using encoder odometry
//!   and a pair of PID loops.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod hw;
pub mod mov_ctrl;
