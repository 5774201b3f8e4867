//! # Maneuver layer
//!
//! One-shot threshold detectors and the motion primitives built on them.
//! Primitives only set setpoints and read odometry: they sit above the cyclic
//! tick and take no part in its numeric core. The expected calling pattern is
//! one primitive call per cycle, after the tick has processed the latest
//! sensing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{MovCtrl, MovCtrlError};
use util::maths::{ang_shortest_diff, logistic};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A one-shot threshold detector.
///
/// Idle until first checked, at which point it captures the current
/// measurement as its reference. It fires exactly once, on the check where
/// the travel from the reference reaches the target, returning to idle so
/// that the next check re-arms from the then-current measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct Latch {
    reference: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Latch {
    /// True if the latch has captured a reference and not yet fired.
    pub fn is_armed(&self) -> bool {
        self.reference.is_some()
    }

    /// Force the latch back to idle without firing.
    pub fn disarm(&mut self) {
        self.reference = None;
    }

    /// Check the latch against the current measurement.
    ///
    /// Arms from `current` if idle. Returns `true` exactly on the check where
    /// `|current - reference| >= |target|`, or if `force_reset` is set, going
    /// back to idle at the same time.
    pub fn check(&mut self, current: f64, target: f64, force_reset: bool) -> bool {
        let reference = *self.reference.get_or_insert(current);

        let reached = (current - reference).abs() >= target.abs() || force_reset;

        if reached {
            self.reference = None;
        }

        reached
    }
}

impl MovCtrl {
    /// Check a distance latch against the current odometry reading.
    pub fn distance_flag(&self, target_cm: f64, latch: &mut Latch) -> bool {
        latch.check(self.distance_cm(), target_cm, false)
    }

    /// Check an orientation latch against the current odometry reading.
    pub fn orientation_flag(&self, target_rad: f64, latch: &mut Latch) -> bool {
        latch.check(self.orientation_rad(), target_rad, false)
    }

    /// Demand a combined body motion, setting both setpoints.
    pub fn drive(&mut self, velocity_cms: f64, ang_velocity_rads: f64) {
        self.set_velocity(velocity_cms);
        self.set_angular_velocity(ang_velocity_rads);
    }

    /// Drive straight until the given distance has been covered.
    ///
    /// Uses the module's own distance latch, so only one `forward` maneuver
    /// can be in flight at a time. Returns `true` exactly on the call where
    /// the distance is reached; the setpoints are left at their final values
    /// and it is the caller's job to `stop` or begin the next maneuver.
    pub fn forward(&mut self, velocity_cms: f64, distance_cm: f64, force_reset: bool) -> bool {
        let current = self.distance_cm();
        let reached = self.fwd_latch.check(current, distance_cm, force_reset);

        if !reached {
            self.drive(velocity_cms, 0.0);
        }

        reached
    }

    /// Turn along an arc of the given radius until the heading has changed by
    /// the given angle.
    ///
    /// An infinite radius demands a straight line (no angular velocity). A
    /// radius of zero is rejected: the arc's angular velocity would be
    /// undefined.
    pub fn rotate(
        &mut self,
        velocity_cms: f64,
        radius_cm: f64,
        angle_rad: f64,
        force_reset: bool,
    ) -> Result<bool, MovCtrlError> {
        let ang_velocity = turn_rate(velocity_cms, radius_cm)?;

        Ok(self.rotate_angular_velocity(velocity_cms, ang_velocity, angle_rad, force_reset))
    }

    /// Turn at a fixed angular velocity until the heading has changed by the
    /// given angle.
    ///
    /// Uses the module's own orientation latch, with the same one-user and
    /// completion semantics as [`MovCtrl::forward`].
    pub fn rotate_angular_velocity(
        &mut self,
        velocity_cms: f64,
        ang_velocity_rads: f64,
        angle_rad: f64,
        force_reset: bool,
    ) -> bool {
        let current = self.orientation_rad();
        let reached = self.rot_latch.check(current, angle_rad, force_reset);

        if !reached {
            self.drive(velocity_cms, ang_velocity_rads);
        }

        reached
    }

    /// Follow an arc of the given radius while correcting the heading towards
    /// a target orientation.
    ///
    /// The arc's open-loop turn rate is scaled by a bounded logistic function
    /// of the signed shortest heading error, so the turn saturates gracefully
    /// for large errors and dies away as the target heading is reached,
    /// without a third control loop.
    pub fn move_united(
        &mut self,
        velocity_cms: f64,
        radius_cm: f64,
        target_orientation_rad: f64,
    ) -> Result<(), MovCtrlError> {
        let base_ang_velocity = turn_rate(velocity_cms, radius_cm)?;

        // Positive when the current heading leads the target
        let heading_error = ang_shortest_diff(self.orientation_rad(), target_orientation_rad);

        let gain = logistic(
            heading_error,
            self.params.blend_midpoint,
            self.params.blend_amplitude,
            self.params.blend_steepness,
            self.params.blend_offset,
        );

        self.drive(velocity_cms, gain * -base_ang_velocity);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Angular velocity of an arc of the given radius at the given speed.
///
/// An infinite radius is the sentinel for a straight line and yields zero. A
/// radius of zero, or one that is not a number, is rejected.
fn turn_rate(velocity_cms: f64, radius_cm: f64) -> Result<f64, MovCtrlError> {
    if radius_cm.is_infinite() {
        Ok(0.0)
    } else if radius_cm == 0.0 || radius_cm.is_nan() {
        Err(MovCtrlError::InvalidTurnRadius(radius_cm))
    } else {
        Ok(velocity_cms / radius_cm)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
