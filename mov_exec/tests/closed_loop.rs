//! Closed-loop tests of motion control against the simulated drive hardware.
//!
//! Each test wires `MovCtrl` to `SimMotion` the same way the executable's
//! main loop does, then drives the loop for a window of simulated time. The
//! loops are expected to converge, not to integrate exactly, so assertions
//! use convergence tolerances.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use mov_lib::{
    hw::{
        sim::{SimMotion, SimParams},
        MotionHw, Wheel,
    },
    mov_ctrl::{InputData, MotorDems, MovCtrl, Params, StatusReport},
};
use util::module::State;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Control cycle period, matching the executable.
const CYCLE_PERIOD_S: f64 = 0.01;

// ---------------------------------------------------------------------------
// HARNESS
// ---------------------------------------------------------------------------

struct Harness {
    sim: SimMotion,
    ctrl: MovCtrl,
}

impl Harness {
    /// Build a controller/simulation pair with proportional-only loop gains,
    /// which keep the closed-loop response first-order and easy to reason
    /// about in assertions.
    fn new() -> Self {
        Self::with_sim_params(SimParams {
            max_wheel_speed_cms: 50.0,
            wheel_diameter_cm: 2.992126,
            encoder_pulses_per_rev: 3200.0,
        })
    }

    fn with_sim_params(sim_params: SimParams) -> Self {
        let mut ctrl = MovCtrl::with_params(Params::default());
        ctrl.set_pid_velocity(0.7, 0.0, 0.0, 0.0);
        ctrl.set_pid_angular(0.7, 0.0, 0.0, 0.0);

        let mut harness = Self {
            sim: SimMotion::new(sim_params),
            ctrl,
        };

        // Burn the first tick so the speed samplers have a baseline
        let report = harness.cycle().1;
        assert!(report.sample_skipped);

        harness
    }

    /// Run one control cycle, returning the motor demands and status report.
    fn cycle(&mut self) -> (MotorDems, StatusReport) {
        self.sim.step(CYCLE_PERIOD_S);

        let input = InputData {
            left_pulses: self.sim.encoder_count(Wheel::Left),
            right_pulses: self.sim.encoder_count(Wheel::Right),
            time_us: self.sim.monotonic_us(),
        };

        let (dems, report) = self.ctrl.proc(&input).unwrap();

        self.sim.set_motor(Wheel::Left, dems.left_dem);
        self.sim.set_motor(Wheel::Right, dems.right_dem);

        (dems, report)
    }

    /// Run the loop for a window of simulated seconds.
    fn run(&mut self, seconds: f64) {
        let cycles = (seconds / CYCLE_PERIOD_S).round() as usize;
        for _ in 0..cycles {
            self.cycle();
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[test]
fn straight_line_velocity_hold() {
    let mut harness = Harness::new();
    harness.ctrl.reset_distance();
    harness.ctrl.reset_orientation();

    harness.ctrl.set_velocity(10.0);
    harness.run(1.0);

    // 10 cm/s held for a simulated second, less the convergence transient
    let distance = harness.ctrl.distance_cm();
    assert!(
        (distance - 10.0).abs() < 0.8,
        "distance after 1 s was {} cm",
        distance
    );

    // A straight drive must not accumulate heading
    let orientation = harness.ctrl.orientation_rad();
    assert!(
        orientation.abs() < 0.02,
        "orientation after straight drive was {} rad",
        orientation
    );

    // The measured velocity getter reflects the converged loop
    let measured = harness.ctrl.get_velocity();
    assert!(
        (measured - 10.0).abs() < 1.0,
        "measured velocity was {} cm/s",
        measured
    );
}

#[test]
fn angular_velocity_hold_converges_to_pi() {
    let mut harness = Harness::new();
    harness.ctrl.reset_distance();
    harness.ctrl.reset_orientation();

    harness.ctrl.set_angular_velocity(std::f64::consts::FRAC_PI_2);
    harness.run(2.0);

    let orientation = harness.ctrl.orientation_rad();
    assert!(
        (orientation - std::f64::consts::PI).abs() < 0.15,
        "orientation after 2 s at pi/2 rad/s was {} rad",
        orientation
    );

    // A point turn must not travel
    let distance = harness.ctrl.distance_cm();
    assert!(
        distance.abs() < 0.3,
        "distance after point turn was {} cm",
        distance
    );
}

#[test]
fn forward_latch_fires_once_and_rearms() {
    let mut harness = Harness::new();
    harness.ctrl.reset_distance();

    // First maneuver: 5 cm at 10 cm/s
    let mut first_trigger_cm = None;
    for _ in 0..500 {
        harness.cycle();
        if harness.ctrl.forward(10.0, 5.0, false) {
            first_trigger_cm = Some(harness.ctrl.distance_cm());
            break;
        }
    }

    let first_trigger_cm = first_trigger_cm.expect("forward never reported completion");
    assert!(
        first_trigger_cm >= 5.0 && first_trigger_cm < 5.6,
        "first trigger at {} cm",
        first_trigger_cm
    );

    // The latch re-arms from the position at the next call, not from the
    // original baseline, so a second identical maneuver covers a further 5 cm
    let mut second_trigger_cm = None;
    for _ in 0..500 {
        harness.cycle();
        if harness.ctrl.forward(10.0, 5.0, false) {
            second_trigger_cm = Some(harness.ctrl.distance_cm());
            break;
        }
    }

    let second_trigger_cm = second_trigger_cm.expect("second forward never completed");
    let leg = second_trigger_cm - first_trigger_cm;
    assert!(
        leg >= 5.0 && leg < 5.8,
        "second leg covered {} cm",
        leg
    );
}

#[test]
fn forward_force_reset_completes_immediately() {
    let mut harness = Harness::new();
    harness.ctrl.reset_distance();

    // Arm the latch with a target that is nowhere near reached
    assert!(!harness.ctrl.forward(10.0, 1000.0, false));
    harness.run(0.1);

    assert!(harness.ctrl.forward(10.0, 1000.0, true));
}

#[test]
fn motor_demands_stay_bounded_under_extreme_demand() {
    // A drive train that cannot reach the demanded speed, so the actuation
    // integrator winds into its bound
    let mut harness = Harness::with_sim_params(SimParams {
        max_wheel_speed_cms: 20.0,
        wheel_diameter_cm: 2.992126,
        encoder_pulses_per_rev: 3200.0,
    });

    harness.ctrl.set_velocity(30.0);

    let mut limited = false;
    for _ in 0..100 {
        let (dems, report) = harness.cycle();

        assert!(dems.left_dem >= -1.0 && dems.left_dem <= 1.0);
        assert!(dems.right_dem >= -1.0 && dems.right_dem <= 1.0);

        limited |= report.left_dem_limited || report.right_dem_limited;
    }

    assert!(limited, "actuation never reported hitting its bound");
}

#[test]
fn stop_brings_measured_velocity_to_zero() {
    let mut harness = Harness::new();

    harness.ctrl.set_velocity(10.0);
    harness.run(0.5);

    harness.ctrl.stop();
    harness.run(1.0);

    let measured = harness.ctrl.get_velocity();
    assert!(
        measured.abs() < 0.5,
        "measured velocity after stop was {} cm/s",
        measured
    );
}

#[test]
fn united_arc_converges_on_target_heading() {
    let mut harness = Harness::new();
    harness.ctrl.reset_distance();
    harness.ctrl.reset_orientation();

    // Arc at 10 cm/s on a 20 cm radius towards a heading of pi/2
    let target = std::f64::consts::FRAC_PI_2;
    for _ in 0..900 {
        harness.cycle();
        harness.ctrl.move_united(10.0, 20.0, target).unwrap();
    }

    let error = util::maths::ang_shortest_diff(harness.ctrl.orientation_rad(), target);
    assert!(
        error.abs() < 0.1,
        "heading error after united arc was {} rad",
        error
    );
}

#[test]
fn united_arc_rejects_zero_radius() {
    let mut harness = Harness::new();

    assert!(harness.ctrl.move_united(10.0, 0.0, 0.0).is_err());
    assert!(harness.ctrl.rotate(10.0, 0.0, 1.0, false).is_err());
}
