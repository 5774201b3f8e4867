//! Parameters structure for MovCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Motion control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Diameter of the driven wheels.
    ///
    /// Units: centimeters
    pub wheel_diameter_cm: f64,

    /// Distance between the two driven wheels, measured between the wheel
    /// contact points.
    ///
    /// Units: centimeters
    pub wheel_base_cm: f64,

    /// Number of encoder pulses per wheel revolution.
    pub encoder_pulses_per_rev: f64,

    // ---- CAPABILITIES ----
    /// Maximum linear body velocity (highest positive value).
    ///
    /// Units: centimeters/second
    pub max_velocity_cms: f64,

    // ---- VELOCITY LOOP GAINS ----
    /// Proportional gain of the linear velocity loop.
    pub vel_k_p: f64,

    /// Integral gain of the linear velocity loop.
    pub vel_k_i: f64,

    /// Derivative gain of the linear velocity loop.
    pub vel_k_d: f64,

    /// Bound on the accumulated integral of the linear velocity loop. A
    /// non-positive value leaves the integral unbounded.
    pub vel_integral_cutoff: f64,

    // ---- ANGULAR LOOP GAINS ----
    /// Proportional gain of the angular velocity loop.
    pub ang_k_p: f64,

    /// Integral gain of the angular velocity loop.
    pub ang_k_i: f64,

    /// Derivative gain of the angular velocity loop.
    pub ang_k_d: f64,

    /// Bound on the accumulated integral of the angular velocity loop. A
    /// non-positive value leaves the integral unbounded.
    pub ang_integral_cutoff: f64,

    // ---- HEADING BLEND ----
    /// Midpoint of the logistic heading blend.
    ///
    /// Units: radians
    pub blend_midpoint: f64,

    /// Amplitude of the logistic heading blend.
    pub blend_amplitude: f64,

    /// Steepness of the logistic heading blend.
    ///
    /// Units: 1/radians
    pub blend_steepness: f64,

    /// Offset of the logistic heading blend. Set to `-blend_amplitude / 2`
    /// for a blend which is zero at zero heading error.
    pub blend_offset: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Distance travelled by a wheel per encoder pulse.
    ///
    /// Units: centimeters
    pub fn pulse_to_dist_cm(&self) -> f64 {
        std::f64::consts::PI * self.wheel_diameter_cm / self.encoder_pulses_per_rev
    }

    /// Maximum angular body velocity, derived from the maximum linear
    /// velocity and the wheel base.
    ///
    /// Units: radians/second
    pub fn max_ang_velocity_rads(&self) -> f64 {
        self.max_velocity_cms / self.wheel_base_cm
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_diameter_cm: 2.992126,
            wheel_base_cm: 7.5,
            encoder_pulses_per_rev: 3200.0,
            max_velocity_cms: 30.0,
            vel_k_p: 0.7,
            vel_k_i: 0.0,
            vel_k_d: 0.07,
            vel_integral_cutoff: 0.0,
            ang_k_p: 2.0,
            ang_k_i: 0.0,
            ang_k_d: 0.07,
            ang_integral_cutoff: 0.0,
            blend_midpoint: 0.0,
            blend_amplitude: 2.0,
            blend_steepness: 2.0,
            blend_offset: -1.0,
        }
    }
}
