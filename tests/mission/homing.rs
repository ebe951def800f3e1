extern crate nyx_rendezvous as rdv;

use approx::assert_relative_eq;
use rdv::control::CostWeights;
use rdv::io::FlightLog;
use rdv::linalg::Vector3;
use rdv::md::*;
use rdv::sim::{RelativeMotionSim, Vessel};
use rdv::vessel::{BurnDirection, OrbitQuery, Propulsion, TelemetrySource};
use rdv::RelativeState;
use std::f64::consts::TAU;

fn drifting_chaser(radial_m: f64) -> RelativeMotionSim {
    let (earth, radius) = crate::scenario_orbit();
    let drift = 1.5 * crate::SCENARIO_RATE * radial_m;
    RelativeMotionSim::new(
        earth,
        radius,
        RelativeState::from_cartesian(
            Vector3::new(radial_m, 0.0, 0.0),
            Vector3::new(0.0, drift, 0.0),
        ),
    )
    .unwrap()
}

#[test]
fn homing_hohmann_transfer() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let sim = drifting_chaser(200.0);
    let gnc = Gnc::synthesize(sim.orbital_rate(), CostWeights::default()).unwrap();
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, sim.body(), &gnc, &log);

    let mut homing = Homing::new(HomingSettings::default());
    let transfer = homing.transfer(&ctx).unwrap();
    println!("{transfer}");
    assert_relative_eq!(transfer.delta_h_m, 200.0, epsilon = 1e-6);
    assert_relative_eq!(transfer.delta_v_m_s, 0.05, epsilon = 1e-9);

    homing.execute_phase(&ctx).unwrap();
    assert_eq!(homing.status(), PhaseStatus::Completed);

    // Two prograde RCS burns, half a target period apart
    let burns = sim.executed_maneuvers();
    assert_eq!(burns.len(), 2);
    for burn in &burns {
        assert_eq!(burn.direction, BurnDirection::Prograde);
        assert_eq!(burn.propulsion, Propulsion::Rcs);
        assert_relative_eq!(burn.delta_v_m_s, 0.05, epsilon = 1e-9);
    }
    let period = target.period();
    assert_relative_eq!(period, TAU / crate::SCENARIO_RATE, max_relative = 1e-12);
    assert_relative_eq!(burns[1].ut - burns[0].ut, period / 2.0, epsilon = 1e-6);
    assert!(sim.ut() >= burns[0].ut + period);

    // On the target orbit, 1 km behind it
    let state = sim.state();
    println!("final state: {state}");
    assert!(state.position().x.abs() < 1.0);
    assert!((state.position().y - 1000.0).abs() < 5.0);
    assert!(state.velocity().norm() < 0.05);
    assert_eq!(sim.held_command(), Vector3::zeros());

    let records = log.phase(PhaseKind::Homing);
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.actuated));
    // Closed loop starts after the coast
    assert!(records[0].tau >= 0.25 * period - 1e-6);

    // A phase only runs once
    assert!(matches!(
        homing.execute_phase(&ctx),
        Err(PhaseError::AlreadyExecuted { .. })
    ));
    assert_eq!(homing.status(), PhaseStatus::Completed);
}

#[test]
fn homing_chaser_above_target() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let sim = drifting_chaser(-50.0);
    let gnc = Gnc::synthesize(sim.orbital_rate(), CostWeights::default()).unwrap();
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, sim.body(), &gnc, &log);

    let mut mission = Mission::from_phases(vec![
        Homing::new(HomingSettings::default()).into(),
        CloseRangeManeuver::new(CloseRangeSettings::default()).into(),
    ])
    .unwrap();

    match mission.run(&ctx) {
        Err(MissionError::PhaseFailed {
            kind: PhaseKind::Homing,
            source: PhaseError::ChaserAboveTarget { delta_h },
        }) => assert_relative_eq!(delta_h, -50.0, epsilon = 1e-6),
        other => panic!("expected the homing phase to fail, got {other:?}"),
    }

    assert_eq!(
        mission.statuses(),
        vec![
            (PhaseKind::Homing, PhaseStatus::Failed),
            (PhaseKind::CloseRangeManeuver, PhaseStatus::NotStarted),
        ]
    );
    // Nothing was flown
    assert!(sim.executed_maneuvers().is_empty());
    assert!(log.is_empty());
}

#[test]
fn homing_coast_past_recircularization() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let sim = drifting_chaser(200.0);
    let gnc = Gnc::synthesize(sim.orbital_rate(), CostWeights::default()).unwrap();
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, sim.body(), &gnc, &log);

    let settings = HomingSettings::builder().coast_fraction(1.2).build();
    let mut homing = Homing::new(settings);
    match homing.execute_phase(&ctx) {
        Err(PhaseError::RecircularizationSkipped { coast_fraction }) => {
            assert_eq!(coast_fraction, 1.2)
        }
        other => panic!("expected the homing phase to fail, got {other:?}"),
    }
    assert_eq!(homing.status(), PhaseStatus::Failed);

    // Only the transfer burn was flown and the loop never closed
    assert_eq!(sim.executed_maneuvers().len(), 1);
    assert!(log.phase(PhaseKind::Homing).is_empty());
    assert_eq!(sim.held_command(), Vector3::zeros());
}
