//! # Kinematic mixer
//!
//! The linear transform between combined body motion and individual wheel
//! speeds, and its inverse. The forward form synthesises per-wheel terms from
//! the PID outputs, the inverse form reconstructs the measured body velocity
//! from sampled wheel speeds. The two are exact algebraic inverses.
//!
//! Sign convention: the left wheel running faster than the right produces a
//! positive angular velocity (an anticlockwise turn viewed from above). This
//! must stay consistent with the odometry estimator's orientation sign.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Body velocity of the robot.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct BodyVel {
    /// Linear velocity along the robot's forward axis.
    ///
    /// Units: centimeters/second
    pub lin_cms: f64,

    /// Angular velocity about the robot's vertical axis, positive
    /// anticlockwise.
    ///
    /// Units: radians/second
    pub ang_rads: f64,
}

/// Per-wheel surface speeds.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct WheelSpeeds {
    /// Left wheel surface speed.
    ///
    /// Units: centimeters/second
    pub left_cms: f64,

    /// Right wheel surface speed.
    ///
    /// Units: centimeters/second
    pub right_cms: f64,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Mix a body velocity into per-wheel speeds.
pub fn forward_mix(body: &BodyVel, wheel_base_cm: f64) -> WheelSpeeds {
    WheelSpeeds {
        left_cms: body.lin_cms + body.ang_rads * wheel_base_cm / 2.0,
        right_cms: body.lin_cms - body.ang_rads * wheel_base_cm / 2.0,
    }
}

/// Reconstruct a body velocity from per-wheel speeds.
pub fn inverse_mix(wheels: &WheelSpeeds, wheel_base_cm: f64) -> BodyVel {
    BodyVel {
        lin_cms: (wheels.left_cms + wheels.right_cms) / 2.0,
        ang_rads: (wheels.left_cms - wheels.right_cms) / wheel_base_cm,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
