//! # Odometry estimator
//!
//! Converts accumulated encoder pulse counts into the distance travelled by
//! the midpoint of the wheel base and the heading relative to a movable zero
//! reference. Resets compose: each reset adds the current relative reading
//! into the offset, so the next read returns zero without discarding the raw
//! counts that other readers may still depend on.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Relative distance and orientation estimation from encoder pulse counts.
#[derive(Debug, Default, Clone)]
pub struct OdometryEstimator {
    /// Distance travelled by a wheel per encoder pulse.
    ///
    /// Units: centimeters
    pulse_to_dist_cm: f64,

    /// Distance between the two driven wheels.
    ///
    /// Units: centimeters
    wheel_base_cm: f64,

    /// Accumulated distance offset from resets.
    ///
    /// Units: centimeters
    distance_offset_cm: f64,

    /// Accumulated orientation offset from resets.
    ///
    /// Units: radians
    orientation_offset_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl OdometryEstimator {
    /// Create a new estimator with zeroed offsets.
    pub fn new(params: &Params) -> Self {
        Self {
            pulse_to_dist_cm: params.pulse_to_dist_cm(),
            wheel_base_cm: params.wheel_base_cm,
            distance_offset_cm: 0.0,
            orientation_offset_rad: 0.0,
        }
    }

    /// Distance travelled by the midpoint of the wheel base since the last
    /// distance reset.
    ///
    /// Units: centimeters
    pub fn distance_cm(&self, left_pulses: i64, right_pulses: i64) -> f64 {
        (left_pulses + right_pulses) as f64 * self.pulse_to_dist_cm / 2.0 - self.distance_offset_cm
    }

    /// Heading since the last orientation reset, positive anticlockwise.
    ///
    /// The heading accumulates beyond `[-pi, pi]`: three full anticlockwise
    /// turns read as `6 * pi`.
    ///
    /// Units: radians
    pub fn orientation_rad(&self, left_pulses: i64, right_pulses: i64) -> f64 {
        (left_pulses - right_pulses) as f64 * self.pulse_to_dist_cm / self.wheel_base_cm
            - self.orientation_offset_rad
    }

    /// Move the distance zero reference to the current position.
    pub fn reset_distance(&mut self, left_pulses: i64, right_pulses: i64) {
        self.distance_offset_cm += self.distance_cm(left_pulses, right_pulses);
    }

    /// Move the orientation zero reference to the current heading.
    pub fn reset_orientation(&mut self, left_pulses: i64, right_pulses: i64) {
        self.orientation_offset_rad += self.orientation_rad(left_pulses, right_pulses);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn estimator() -> OdometryEstimator {
        OdometryEstimator::new(&Params::default())
    }

    #[test]
    fn equal_pulses_are_pure_distance() {
        let odo = estimator();
        let pulse_to_dist = Params::default().pulse_to_dist_cm();

        assert_relative_eq!(odo.distance_cm(1000, 1000), 1000.0 * pulse_to_dist);
        assert_relative_eq!(odo.orientation_rad(1000, 1000), 0.0);
    }

    #[test]
    fn opposite_pulses_are_pure_rotation() {
        let odo = estimator();
        let params = Params::default();
        let pulse_to_dist = params.pulse_to_dist_cm();

        assert_relative_eq!(odo.distance_cm(500, -500), 0.0);
        assert_relative_eq!(
            odo.orientation_rad(500, -500),
            1000.0 * pulse_to_dist / params.wheel_base_cm
        );

        // Left wheel advancing faster than right is a positive (left) turn
        assert!(odo.orientation_rad(500, -500) > 0.0);
    }

    #[test]
    fn resets_zero_the_reading_and_compose() {
        let mut odo = estimator();

        odo.reset_distance(1000, 1000);
        assert_relative_eq!(odo.distance_cm(1000, 1000), 0.0);

        // Resetting again without motion changes nothing
        odo.reset_distance(1000, 1000);
        assert_relative_eq!(odo.distance_cm(1000, 1000), 0.0);

        // A second reset after more motion composes with the first
        odo.reset_distance(2000, 2000);
        assert_relative_eq!(odo.distance_cm(2000, 2000), 0.0);

        let pulse_to_dist = Params::default().pulse_to_dist_cm();
        assert_relative_eq!(odo.distance_cm(3000, 3000), 1000.0 * pulse_to_dist);
    }

    #[test]
    fn orientation_reset_is_independent_of_distance_reset() {
        let mut odo = estimator();

        odo.reset_orientation(500, -500);
        assert_relative_eq!(odo.orientation_rad(500, -500), 0.0);

        // Distance reading is untouched by the orientation reset
        assert_relative_eq!(odo.distance_cm(500, -500), 0.0);
    }
}
