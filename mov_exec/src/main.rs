//! Main motion-control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and all modules
//!     - Main loop:
//!         - System input acquisition:
//!             - Encoder and clock sensing
//!         - Motion control processing
//!         - Motor demand execution
//!         - Maneuver sequencing
//!
//! Without real drive hardware attached the executable runs the loop against
//! the deterministic simulation in [`mov_lib::hw::sim`], stepping simulated
//! time by a fixed period each cycle and walking through a short maneuver
//! demonstration: a straight drive, a point turn and a heading-corrected arc.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};

// Internal
use mov_lib::{
    hw::{
        sim::{SimMotion, SimParams},
        MotionHw, Wheel,
    },
    mov_ctrl::{InputData, MovCtrl},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.01;

/// Bound on the number of cycles a single maneuver may run for. Maneuvers are
/// not self-bounding, limiting their duration is this loop's job.
const MAX_MNVR_CYCLES: usize = 10_000;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("mov_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Hermes Rover Motion Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- MODULE INITIALISATION ----

    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;
    let mut sim = SimMotion::new(sim_params);

    let mut mov_ctrl = MovCtrl::default();
    mov_ctrl
        .init("mov_ctrl.toml", &session)
        .wrap_err("Failed to initialise MovCtrl")?;

    info!("Modules initialised\n");

    // ---- MANEUVER DEMONSTRATION ----

    // Maneuver 1: drive 50 cm straight at 10 cm/s
    info!("Maneuver 1: forward 50 cm at 10 cm/s");
    mov_ctrl.reset_distance();
    mov_ctrl.reset_orientation();

    run_mnvr(&mut sim, &mut mov_ctrl, |ctrl| ctrl.forward(10.0, 50.0, false))?;
    mov_ctrl.stop();
    log_odometry(&mov_ctrl);

    // Maneuver 2: point turn through pi/2 at pi/4 rad/s
    info!("Maneuver 2: point turn through pi/2");
    mov_ctrl.reset_distance();
    mov_ctrl.reset_orientation();

    run_mnvr(&mut sim, &mut mov_ctrl, |ctrl| {
        ctrl.rotate_angular_velocity(0.0, std::f64::consts::FRAC_PI_4, std::f64::consts::FRAC_PI_2, false)
    })?;
    mov_ctrl.stop();
    log_odometry(&mov_ctrl);

    // Maneuver 3: arc at 10 cm/s on a 20 cm radius, correcting the heading
    // towards 3pi/4. The arc converges on the target heading asymptotically,
    // so run it for a fixed window of simulated seconds.
    info!("Maneuver 3: heading-corrected arc towards 3pi/4");
    mov_ctrl.reset_distance();
    mov_ctrl.reset_orientation();

    let arc_cycles = (8.0 / CYCLE_PERIOD_S) as usize;
    for _ in 0..arc_cycles {
        cycle(&mut sim, &mut mov_ctrl)?;
        mov_ctrl.move_united(10.0, 20.0, 3.0 * std::f64::consts::FRAC_PI_4)?;
    }
    mov_ctrl.stop();
    log_odometry(&mov_ctrl);

    // Wind the robot down before exiting
    mov_ctrl.reset_actuation();
    cycle(&mut sim, &mut mov_ctrl)?;

    info!("Demonstration complete");

    Ok(())
}

/// Run one control cycle: step the simulation, acquire sensing, process
/// motion control and execute the motor demands.
fn cycle(sim: &mut SimMotion, mov_ctrl: &mut MovCtrl) -> Result<(), Report> {
    sim.step(CYCLE_PERIOD_S);

    let input = InputData {
        left_pulses: sim.encoder_count(Wheel::Left),
        right_pulses: sim.encoder_count(Wheel::Right),
        time_us: sim.monotonic_us(),
    };

    let (dems, _report) = mov_ctrl
        .proc(&input)
        .wrap_err("MovCtrl processing failed")?;

    sim.set_motor(Wheel::Left, dems.left_dem);
    sim.set_motor(Wheel::Right, dems.right_dem);

    Ok(())
}

/// Cycle the control loop until the maneuver reports completion.
fn run_mnvr<F>(sim: &mut SimMotion, mov_ctrl: &mut MovCtrl, mut mnvr: F) -> Result<(), Report>
where
    F: FnMut(&mut MovCtrl) -> bool,
{
    for _ in 0..MAX_MNVR_CYCLES {
        cycle(sim, mov_ctrl)?;

        if mnvr(mov_ctrl) {
            return Ok(());
        }
    }

    warn!("Maneuver did not complete within {} cycles", MAX_MNVR_CYCLES);

    Ok(())
}

/// Log the current odometry readings.
fn log_odometry(mov_ctrl: &MovCtrl) {
    info!(
        "    distance: {:.2} cm, orientation: {:.3} rad\n",
        mov_ctrl.distance_cm(),
        mov_ctrl.orientation_rad()
    );
}
