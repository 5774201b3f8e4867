//! # Motion control module
//!
//! Motion control turns body velocity setpoints into per-wheel motor demands
//! for a two wheel differential drive robot. It does this using a pair of PID
//! controllers operating on the linear and angular body velocity respectively,
//! with measurements reconstructed from encoder deltas.
//!
//! Each cycle flows in one direction: encoder/clock sensing in, per-wheel
//! speed sampling, the inverse kinematic mix into measured body velocity, the
//! two PID loops, the forward mix back into per-wheel terms, and finally the
//! integration of those terms into a rate-limited actuation state which is
//! emitted as the motor demand pair.
//!
//! On top of the cyclic core sits a maneuver layer: one-shot distance and
//! orientation latches, straight drives, point turns, and an arc primitive
//! which corrects its heading towards a target using a bounded logistic blend
//! rather than a third control loop.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mixer;
mod mnvr;
mod odometry;
mod params;
mod pid;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use mixer::*;
pub use mnvr::*;
pub use odometry::*;
pub use params::*;
pub use pid::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MovCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum MovCtrlError {
    #[error(
        "A turn radius of {0} is undefined, use f64::INFINITY to demand a \
        straight line"
    )]
    InvalidTurnRadius(f64),
}
