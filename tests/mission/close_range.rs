extern crate nyx_rendezvous as rdv;

use rdv::control::CostWeights;
use rdv::io::FlightLog;
use rdv::linalg::Vector3;
use rdv::md::*;
use rdv::sim::{RelativeMotionSim, Vessel};
use rdv::time::Unit;
use rdv::vessel::TelemetrySource;
use rdv::RelativeState;

#[test]
fn close_range_vbar_approach() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let (earth, radius) = crate::scenario_orbit();
    let sim = RelativeMotionSim::new(
        earth,
        radius,
        RelativeState::from_cartesian(Vector3::new(0.0, 1000.0, 0.0), Vector3::zeros()),
    )
    .unwrap();
    let gnc = Gnc::synthesize(sim.orbital_rate(), CostWeights::new(1e3, 1e5)).unwrap();
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, sim.body(), &gnc, &log);

    let segment = CloseRangeSegment::new([0.0, 500.0, 0.0], Unit::Second * 90, 3.0);
    let settings = CloseRangeSettings {
        control_period: Unit::Millisecond * 100,
        segments: vec![segment],
    };
    let mut close_range = CloseRangeManeuver::new(settings);
    close_range.execute_phase(&ctx).unwrap();

    assert_eq!(close_range.status(), PhaseStatus::Completed);
    assert_eq!(close_range.completed_segments(), 1);
    assert!(sim.ut() >= 180.0);

    let error = sim.state().position() - segment.target_position();
    println!("final position error: {error}");
    assert!(error.norm() < 5.0, "final position error {}", error.norm());
    // Thrusters are off at the end
    assert_eq!(sim.held_command(), Vector3::zeros());

    let records = log.phase(PhaseKind::CloseRangeManeuver);
    assert!(records.len() >= 1800);
    // The reference is held at the final point during the second half
    for record in records.iter().filter(|r| r.tau >= 1.0) {
        assert_eq!(record.reference_position(), segment.target_position());
    }
    // The chaser made it inside the tolerance box and stopped controlling
    assert!(records.iter().any(|r| !r.actuated));
    assert!(records
        .iter()
        .filter(|r| !r.actuated)
        .all(|r| r.tau >= 1.0 && r.command() == Vector3::zeros()));
    // Approach along V-bar, no out-of-plane motion
    assert!(records.iter().all(|r| r.nav_position().z == 0.0));
}

#[test]
fn close_range_segments_chain() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let (earth, radius) = crate::scenario_orbit();
    let sim = RelativeMotionSim::new(
        earth,
        radius,
        RelativeState::from_cartesian(Vector3::new(0.0, 1000.0, 0.0), Vector3::zeros()),
    )
    .unwrap();
    let gnc = Gnc::synthesize(sim.orbital_rate(), CostWeights::default()).unwrap();
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, sim.body(), &gnc, &log);

    let settings = CloseRangeSettings::default();
    let total: f64 = settings
        .segments
        .iter()
        .map(|s| 2.0 * s.duration.to_seconds())
        .sum();
    let last = *settings.segments.last().unwrap();

    let mut mission = Mission::from_phases(vec![CloseRangeManeuver::new(settings).into()]).unwrap();
    mission.run(&ctx).unwrap();
    assert_eq!(
        mission.statuses(),
        vec![(PhaseKind::CloseRangeManeuver, PhaseStatus::Completed)]
    );

    assert!(sim.ut() >= total);
    let error = sim.state().position() - last.target_position();
    println!("final position error: {error}");
    assert!(error.norm() < 5.0);
}
