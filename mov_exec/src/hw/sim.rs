//! # Simulated motion hardware
//!
//! A deterministic stand-in for the robot's drive peripherals, used by the
//! demo executable and the closed-loop tests. Motor demands map linearly onto
//! wheel surface speed, wheel travel accumulates into fractional pulse counts
//! and the monotonic clock only advances when [`SimMotion::step`] is called,
//! so a test controls exactly how much simulated time elapses per cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{MotionHw, Wheel};
use util::maths::{clamp, lin_map};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated motion hardware.
#[derive(Debug, Clone, Deserialize)]
pub struct SimParams {
    /// Wheel surface speed at full motor demand.
    ///
    /// Units: centimeters/second
    pub max_wheel_speed_cms: f64,

    /// Diameter of the driven wheels.
    ///
    /// Units: centimeters
    pub wheel_diameter_cm: f64,

    /// Number of encoder pulses per wheel revolution.
    pub encoder_pulses_per_rev: f64,
}

/// Simulated drive hardware for a two wheel differential robot.
pub struct SimMotion {
    params: SimParams,

    /// Pulses per centimeter of wheel travel, derived from the params.
    pulses_per_cm: f64,

    /// Simulated monotonic clock.
    time_us: u64,

    /// Currently applied motor demands, each in [-1, 1].
    left_dem: f64,
    right_dem: f64,

    /// Fractional accumulated pulse counts. Kept as floats so that slow
    /// motion is not lost to truncation between steps.
    left_pulses: f64,
    right_pulses: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimMotion {
    /// Create a new simulation in the stopped state at clock zero.
    pub fn new(params: SimParams) -> Self {
        let pulses_per_cm =
            params.encoder_pulses_per_rev / (std::f64::consts::PI * params.wheel_diameter_cm);

        Self {
            params,
            pulses_per_cm,
            time_us: 0,
            left_dem: 0.0,
            right_dem: 0.0,
            left_pulses: 0.0,
            right_pulses: 0.0,
        }
    }

    /// Advance the simulation by `dt_s` seconds at the current motor demands.
    pub fn step(&mut self, dt_s: f64) {
        self.time_us += (dt_s * 1e6) as u64;

        let max = self.params.max_wheel_speed_cms;

        let left_speed_cms = lin_map((-1.0, 1.0), (-max, max), self.left_dem);
        let right_speed_cms = lin_map((-1.0, 1.0), (-max, max), self.right_dem);

        self.left_pulses += left_speed_cms * dt_s * self.pulses_per_cm;
        self.right_pulses += right_speed_cms * dt_s * self.pulses_per_cm;
    }
}

impl MotionHw for SimMotion {
    fn encoder_count(&self, wheel: Wheel) -> i64 {
        match wheel {
            Wheel::Left => self.left_pulses as i64,
            Wheel::Right => self.right_pulses as i64,
        }
    }

    fn monotonic_us(&self) -> u64 {
        self.time_us
    }

    fn set_motor(&mut self, wheel: Wheel, dem: f64) {
        let dem = clamp(dem, -1.0, 1.0);

        match wheel {
            Wheel::Left => self.left_dem = dem,
            Wheel::Right => self.right_dem = dem,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> SimParams {
        SimParams {
            max_wheel_speed_cms: 50.0,
            wheel_diameter_cm: 3.0,
            encoder_pulses_per_rev: 3200.0,
        }
    }

    #[test]
    fn full_demand_travels_at_max_speed() {
        let mut sim = SimMotion::new(params());
        sim.set_motor(Wheel::Left, 1.0);
        sim.set_motor(Wheel::Right, 1.0);

        for _ in 0..100 {
            sim.step(0.01);
        }

        // One second at 50 cm/s
        let pulses_per_cm = 3200.0 / (std::f64::consts::PI * 3.0);
        let travel_cm = sim.encoder_count(Wheel::Left) as f64 / pulses_per_cm;
        assert_relative_eq!(travel_cm, 50.0, epsilon = 0.01);
        assert_eq!(sim.monotonic_us(), 1_000_000);
    }

    #[test]
    fn demands_are_clamped() {
        let mut sim = SimMotion::new(params());
        sim.set_motor(Wheel::Left, 10.0);
        sim.set_motor(Wheel::Right, -10.0);

        sim.step(1.0);

        let pulses_per_cm = 3200.0 / (std::f64::consts::PI * 3.0);
        assert_relative_eq!(
            sim.encoder_count(Wheel::Left) as f64 / pulses_per_cm,
            50.0,
            epsilon = 0.01
        );
        assert_relative_eq!(
            sim.encoder_count(Wheel::Right) as f64 / pulses_per_cm,
            -50.0,
            epsilon = 0.01
        );
    }
}
