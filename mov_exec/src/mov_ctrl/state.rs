//! Implementations for the MovCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{
    forward_mix, inverse_mix, BodyVel, Latch, MovCtrlError, OdometryEstimator, Params,
    PidController, WheelSpeeds,
};
use util::{maths::clamp, module::State, params, session::Session, time::micros_to_seconds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Motion control module state.
///
/// All mutation happens on the single control thread: the cyclic [`State::proc`]
/// tick, the setpoint/gain setters and the maneuver layer must not be called
/// concurrently.
#[derive(Debug, Default)]
pub struct MovCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    /// Relative distance/orientation estimation.
    pub(crate) odometry: OdometryEstimator,

    /// Linear body velocity loop.
    pub(crate) vel_pid: PidController,

    /// Angular body velocity loop.
    pub(crate) ang_pid: PidController,

    /// Per-wheel speed sampling history.
    left_sampler: WheelSampler,
    right_sampler: WheelSampler,

    /// Clock time of the previous tick, used for the actuation integration.
    prev_tick_s: Option<f64>,

    /// Most recent raw pulse counts, kept for the odometry readers and the
    /// maneuver layer between ticks.
    pub(crate) last_pulses: (i64, i64),

    /// Measured body velocity reconstructed on the latest tick.
    measured: BodyVel,

    /// Persistent actuation state. Not a direct PID output: each tick adds
    /// the mixed PID outputs scaled by the elapsed time, treating them as an
    /// acceleration-like quantity, then clamps to [-1, 1].
    actuation: MotorDems,

    /// Default latches for the maneuver layer, one per primitive kind. Using
    /// these supports a single concurrent user of each primitive.
    pub(crate) fwd_latch: Latch,
    pub(crate) rot_latch: Latch,
}

/// Sensing acquired by the caller at the start of each cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Accumulated left encoder pulse count.
    pub left_pulses: i64,

    /// Accumulated right encoder pulse count.
    pub right_pulses: i64,

    /// Monotonic clock reading at acquisition.
    ///
    /// Units: microseconds
    pub time_us: u64,
}

/// Normalised motor demands that the hardware must execute.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct MotorDems {
    /// Left motor demand in [-1, 1].
    pub left_dem: f64,

    /// Right motor demand in [-1, 1].
    pub right_dem: f64,
}

/// Status report for MovCtrl processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Measured body velocity on this tick.
    pub measured: BodyVel,

    /// True if a wheel speed sample was unavailable and the tick re-emitted
    /// the held actuation state. Expected on the first tick.
    pub sample_skipped: bool,

    /// True if the corresponding motor demand hit the [-1, 1] bound.
    pub left_dem_limited: bool,
    pub right_dem_limited: bool,
}

/// Per-wheel sampling history for instantaneous speed estimation.
#[derive(Debug, Default, Clone, Copy)]
struct WheelSampler {
    /// Pulse count and clock time of the previous sample.
    prev: Option<(i64, f64)>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WheelSampler {
    /// Sample the instantaneous wheel surface speed from the pulse delta over
    /// the elapsed time.
    ///
    /// Returns `None` on the first sample and whenever the clock has not
    /// advanced, rather than producing an undefined speed. History is updated
    /// in both cases so the next sample has a valid baseline.
    fn sample(&mut self, pulses: i64, now_s: f64, pulse_to_dist_cm: f64) -> Option<f64> {
        let speed = match self.prev {
            Some((prev_pulses, prev_s)) if now_s > prev_s => {
                Some((pulses - prev_pulses) as f64 * pulse_to_dist_cm / (now_s - prev_s))
            }
            _ => None,
        };

        self.prev = Some((pulses, now_s));

        speed
    }
}

impl State for MovCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = InputData;
    type OutputData = MotorDems;
    type StatusReport = StatusReport;
    type ProcError = MovCtrlError;

    /// Initialise the MovCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;
        *self = Self::with_params(params);

        Ok(())
    }

    /// Perform cyclic processing of Motion Control.
    fn proc(&mut self, input_data: &Self::InputData) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let now_s = micros_to_seconds(input_data.time_us);
        let pulse_to_dist = self.params.pulse_to_dist_cm();

        self.last_pulses = (input_data.left_pulses, input_data.right_pulses);

        // Sample both wheel speeds and the tick interval. Each wheel keeps
        // its own history.
        let left_speed = self
            .left_sampler
            .sample(input_data.left_pulses, now_s, pulse_to_dist);
        let right_speed = self
            .right_sampler
            .sample(input_data.right_pulses, now_s, pulse_to_dist);

        let dt = match self.prev_tick_s {
            Some(t0) if now_s > t0 => Some(now_s - t0),
            _ => None,
        };
        self.prev_tick_s = Some(now_s);

        // First tick, or a stalled clock: hold the actuation state rather
        // than feeding an undefined speed into the loops.
        let (left_speed, right_speed, dt_s) = match (left_speed, right_speed, dt) {
            (Some(l), Some(r), Some(dt)) => (l, r, dt),
            _ => {
                self.report.sample_skipped = true;
                return Ok((self.actuation, self.report));
            }
        };

        // Reconstruct the measured body velocity from the wheel samples
        self.measured = inverse_mix(
            &WheelSpeeds {
                left_cms: left_speed,
                right_cms: right_speed,
            },
            self.params.wheel_base_cm,
        );
        self.report.measured = self.measured;

        // Drive both loops against the measurements
        self.vel_pid.set_measured(self.measured.lin_cms);
        self.ang_pid.set_measured(self.measured.ang_rads);

        let wanted = BodyVel {
            lin_cms: self.vel_pid.step(now_s),
            ang_rads: self.ang_pid.step(now_s),
        };

        // Mix the loop outputs into per-wheel terms and integrate them into
        // the actuation state
        let deltas = forward_mix(&wanted, self.params.wheel_base_cm);

        let left_dem = self.actuation.left_dem + deltas.left_cms * dt_s;
        let right_dem = self.actuation.right_dem + deltas.right_cms * dt_s;

        self.actuation.left_dem = clamp(left_dem, -1.0, 1.0);
        self.actuation.right_dem = clamp(right_dem, -1.0, 1.0);

        self.report.left_dem_limited = left_dem != self.actuation.left_dem;
        self.report.right_dem_limited = right_dem != self.actuation.right_dem;

        trace!(
            "MovCtrl measured: ({:.3} cm/s, {:.3} rad/s), dems: ({:.3}, {:.3})",
            self.measured.lin_cms,
            self.measured.ang_rads,
            self.actuation.left_dem,
            self.actuation.right_dem
        );

        Ok((self.actuation, self.report))
    }
}

impl MovCtrl {
    /// Create a new instance directly from a parameter structure.
    ///
    /// Used by the test harnesses; executables initialise through
    /// [`State::init`] with a parameter file path instead.
    pub fn with_params(params: Params) -> Self {
        Self {
            odometry: OdometryEstimator::new(&params),
            vel_pid: PidController::new(
                params.vel_k_p,
                params.vel_k_i,
                params.vel_k_d,
                params.vel_integral_cutoff,
            ),
            ang_pid: PidController::new(
                params.ang_k_p,
                params.ang_k_i,
                params.ang_k_d,
                params.ang_integral_cutoff,
            ),
            params,
            ..Default::default()
        }
    }

    // ---- CONFIGURATION SURFACE ----

    /// Reconfigure the linear velocity loop gains.
    pub fn set_pid_velocity(&mut self, k_p: f64, k_i: f64, k_d: f64, integral_cutoff: f64) {
        self.vel_pid.configure(k_p, k_i, k_d, integral_cutoff);
    }

    /// Reconfigure the angular velocity loop gains.
    pub fn set_pid_angular(&mut self, k_p: f64, k_i: f64, k_d: f64, integral_cutoff: f64) {
        self.ang_pid.configure(k_p, k_i, k_d, integral_cutoff);
    }

    /// Set the linear velocity setpoint, clamped to the physical maximum.
    ///
    /// Units: centimeters/second
    pub fn set_velocity(&mut self, velocity_cms: f64) {
        let max = self.params.max_velocity_cms;
        self.vel_pid.set_setpoint(clamp(velocity_cms, -max, max));
    }

    /// Set the angular velocity setpoint, clamped to the physical maximum.
    ///
    /// Units: radians/second
    pub fn set_angular_velocity(&mut self, ang_velocity_rads: f64) {
        let max = self.params.max_ang_velocity_rads();
        self.ang_pid.set_setpoint(clamp(ang_velocity_rads, -max, max));
    }

    /// Set the setpoints from a per-wheel speed demand.
    ///
    /// The wheel speeds are inverse-mixed into body velocity setpoints, which
    /// are then clamped as usual.
    pub fn set_wheel_speed(&mut self, left_cms: f64, right_cms: f64) {
        let body = inverse_mix(
            &WheelSpeeds {
                left_cms,
                right_cms,
            },
            self.params.wheel_base_cm,
        );

        self.set_velocity(body.lin_cms);
        self.set_angular_velocity(body.ang_rads);
    }

    /// The effective linear velocity setpoint, after clamping.
    pub fn velocity_setpoint(&self) -> f64 {
        self.vel_pid.setpoint()
    }

    /// The effective angular velocity setpoint, after clamping.
    pub fn angular_velocity_setpoint(&self) -> f64 {
        self.ang_pid.setpoint()
    }

    /// The linear body velocity measured on the latest tick.
    ///
    /// Units: centimeters/second
    pub fn get_velocity(&self) -> f64 {
        self.measured.lin_cms
    }

    /// The angular body velocity measured on the latest tick.
    ///
    /// Units: radians/second
    pub fn get_angular_velocity(&self) -> f64 {
        self.measured.ang_rads
    }

    /// Zero both setpoints.
    ///
    /// The actuation integrator is deliberately left alone: the loops will
    /// wind it down against the measured velocity. Use
    /// [`MovCtrl::reset_actuation`] to drop the motor demands immediately.
    pub fn stop(&mut self) {
        self.set_velocity(0.0);
        self.set_angular_velocity(0.0);
    }

    /// Zero the actuation integrator, cutting the motor demands on the next
    /// tick.
    pub fn reset_actuation(&mut self) {
        self.actuation = MotorDems::default();
    }

    // ---- ODOMETRY SURFACE ----

    /// Distance travelled since the last distance reset, from the latest
    /// acquired pulse counts.
    ///
    /// Units: centimeters
    pub fn distance_cm(&self) -> f64 {
        self.odometry.distance_cm(self.last_pulses.0, self.last_pulses.1)
    }

    /// Heading since the last orientation reset, from the latest acquired
    /// pulse counts.
    ///
    /// Units: radians
    pub fn orientation_rad(&self) -> f64 {
        self.odometry
            .orientation_rad(self.last_pulses.0, self.last_pulses.1)
    }

    /// Move the distance zero reference to the current position.
    pub fn reset_distance(&mut self) {
        self.odometry
            .reset_distance(self.last_pulses.0, self.last_pulses.1);
    }

    /// Move the orientation zero reference to the current heading.
    pub fn reset_orientation(&mut self) {
        self.odometry
            .reset_orientation(self.last_pulses.0, self.last_pulses.1);
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
