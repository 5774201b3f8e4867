//! # Velocity loop PID controller
//!
//! One instance per controlled quantity (linear and angular body velocity).
//! The controller is stepped against the hardware monotonic clock rather than
//! the host's wall clock so that simulated runs are deterministic.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller driving a measured value towards a setpoint.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Derivative gain
    k_d: f64,

    /// Bound on the accumulated integral. Non-positive means unbounded.
    integral_cutoff: f64,

    /// Target value the loop drives towards.
    setpoint: f64,

    /// Most recent measured value of the controlled quantity.
    measured: f64,

    /// The integral accumulation
    integral: f64,

    /// Error at the previous step
    prev_error: Option<f64>,

    /// Clock time of the previous step, in seconds.
    prev_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64, integral_cutoff: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral_cutoff,
            ..Default::default()
        }
    }

    /// Replace the controller gains, clearing the accumulated state.
    ///
    /// The setpoint and measured value survive reconfiguration.
    pub fn configure(&mut self, k_p: f64, k_i: f64, k_d: f64, integral_cutoff: f64) {
        self.k_p = k_p;
        self.k_i = k_i;
        self.k_d = k_d;
        self.integral_cutoff = integral_cutoff;
        self.integral = 0.0;
        self.prev_error = None;
        self.prev_time_s = None;
    }

    /// Set the target value for the loop.
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// The current target value.
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Record the latest measurement of the controlled quantity.
    pub fn set_measured(&mut self, measured: f64) {
        self.measured = measured;
    }

    /// Step the controller at the given clock time and return the control
    /// output.
    ///
    /// The integral and derivative terms use the measured elapsed time since
    /// the previous step. On the first step, or if the clock has not
    /// advanced, neither term contributes: accumulating the raw error or
    /// differentiating against a zero interval would inject a spike that the
    /// actuation integrator downstream would then have to unwind.
    pub fn step(&mut self, now_s: f64) -> f64 {
        let error = self.setpoint - self.measured;

        let dt = match self.prev_time_s {
            Some(t0) if now_s > t0 => Some(now_s - t0),
            _ => None,
        };

        if let Some(t) = dt {
            self.integral += error * t;

            if self.integral_cutoff > 0.0 {
                self.integral = clamp(self.integral, -self.integral_cutoff, self.integral_cutoff);
            }
        }

        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0.0,
        };

        let out = self.k_p * error + self.k_i * self.integral + self.k_d * deriv;

        self.prev_error = Some(error);
        self.prev_time_s = Some(now_s);

        out
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0, 0.0);
        pid.set_setpoint(10.0);
        pid.set_measured(4.0);

        assert_relative_eq!(pid.step(0.0), 12.0);
        assert_relative_eq!(pid.step(0.1), 12.0);
    }

    #[test]
    fn first_step_has_no_integral_or_derivative() {
        let mut pid = PidController::new(0.0, 1.0, 1.0, 0.0);
        pid.set_setpoint(5.0);

        // No previous time: both time-dependent terms must be silent
        assert_relative_eq!(pid.step(100.0), 0.0);
    }

    #[test]
    fn stalled_clock_has_no_integral_or_derivative() {
        let mut pid = PidController::new(0.0, 1.0, 1.0, 0.0);
        pid.set_setpoint(5.0);

        pid.step(1.0);
        assert_relative_eq!(pid.step(1.0), 0.0);
        assert_relative_eq!(pid.step(0.5), 0.0);
    }

    #[test]
    fn integral_accumulates_over_elapsed_time() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.0);
        pid.set_setpoint(2.0);

        pid.step(0.0);
        assert_relative_eq!(pid.step(1.0), 2.0);
        assert_relative_eq!(pid.step(2.0), 4.0);
    }

    #[test]
    fn integral_cutoff_bounds_windup() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 3.0);
        pid.set_setpoint(10.0);

        pid.step(0.0);
        for i in 1..100 {
            pid.step(i as f64);
        }

        // Error of 10 held for 99 s would accumulate to 990 unbounded
        assert_relative_eq!(pid.step(100.0), 3.0);
    }

    #[test]
    fn derivative_tracks_error_rate() {
        let mut pid = PidController::new(0.0, 0.0, 1.0, 0.0);
        pid.set_setpoint(0.0);

        pid.set_measured(0.0);
        pid.step(0.0);

        // Error moves from 0 to -2 over one second
        pid.set_measured(2.0);
        assert_relative_eq!(pid.step(1.0), -2.0);
    }

    #[test]
    fn configure_clears_accumulated_state() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 0.0);
        pid.set_setpoint(2.0);
        pid.step(0.0);
        pid.step(1.0);

        pid.configure(0.0, 1.0, 0.0, 0.0);

        // First step after reconfiguration is a fresh first step
        assert_relative_eq!(pid.step(2.0), 0.0);
    }
}
