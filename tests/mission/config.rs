extern crate nyx_rendezvous as rdv;

use rdv::io::{ConfigRepr, MissionConfig, ScenarioConfig};
use rdv::md::*;
use rdv::time::Unit;
use std::env;
use std::path::PathBuf;

fn data_path(file: &str) -> PathBuf {
    PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()))
        .join("data")
        .join(file)
}

#[test]
fn load_mission_config() {
    let cfg = MissionConfig::load(data_path("rendezvous.yaml")).unwrap();
    cfg.validate().unwrap();
    println!("{}", cfg.dumps().unwrap());

    assert_eq!(cfg.body.name, "Kerbin");
    assert_eq!(
        cfg.phasing,
        PhasingStrategy::SafetyBounded {
            min_altitude_m: 100e3,
            max_apoapsis_factor: 1.3,
            max_orbits: 10
        }
    );
    assert_eq!(cfg.homing, HomingSettings::default());
    assert_eq!(cfg.close_range, CloseRangeSettings::default());

    let mission = Mission::new(&cfg, 900e3).unwrap();
    let kinds: Vec<PhaseKind> = mission.statuses().into_iter().map(|(k, _)| k).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::OrbitRaise,
            PhaseKind::Phasing,
            PhaseKind::Homing,
            PhaseKind::CloseRangeManeuver
        ]
    );
    match &mission.phases()[0] {
        RendezvousPhase::OrbitRaise(raise) => assert_eq!(raise.desired_apoapsis(), 898e3),
        other => panic!("mission starts with {:?}", other.kind()),
    }

    // Round trip through the YAML representation
    assert_eq!(MissionConfig::loads(&cfg.dumps().unwrap()).unwrap(), cfg);
}

#[test]
fn load_scenario_config() {
    let scenario = ScenarioConfig::load(data_path("scenario.yaml")).unwrap();
    assert_eq!(scenario.initial_position_m, [200.0, -3000.0, 0.0]);
    assert_eq!(scenario.rcs_max_accel_m_s2, Some(1.0));
    assert_eq!(scenario.nav_noise.map(|n| n.seed), Some(11));
    assert_eq!(scenario.integration_step, Unit::Millisecond * 50);

    let drifting = scenario.with_circular_drift(2e-3);
    assert!((drifting.initial_velocity_m_s[1] - 0.6).abs() < 1e-12);

    assert!(ScenarioConfig::load(data_path("missing.yaml")).is_err());
    assert!(MissionConfig::loads("costs: 12").is_err());
}
