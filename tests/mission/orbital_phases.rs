extern crate nyx_rendezvous as rdv;

use approx::assert_relative_eq;
use rdv::control::CostWeights;
use rdv::cosmic::CelestialBody;
use rdv::md::*;
use rdv::sim::{KeplerOrbit, KeplerWorld, Vessel};
use rdv::vessel::{BurnDirection, Propulsion, TelemetrySource};
use std::f64::consts::{PI, TAU};

const TARGET_RADIUS_M: f64 = 900e3;
const DESIRED_APOAPSIS_M: f64 = 898e3;

fn gnc(body: &CelestialBody) -> Gnc {
    Gnc::synthesize(body.orbital_rate(TARGET_RADIUS_M), CostWeights::default()).unwrap()
}

/// Chaser at the periapsis of its 800 x 898 km orbit, target placed so that it is `lead_deg` ahead of the
/// chaser apoapsis when the chaser reaches it.
fn phasing_world(lead_deg: f64) -> KeplerWorld {
    let body = CelestialBody::kerbin();
    let gm = body.gm_m3_s2;
    let chaser = KeplerOrbit::from_apsides(gm, 800e3, DESIRED_APOAPSIS_M, 0.0, 0.0);
    let target_rate = body.orbital_rate(TARGET_RADIUS_M);
    let longitude = PI + lead_deg.to_radians() - target_rate * chaser.period() / 2.0;
    let target = KeplerOrbit::circular(gm, TARGET_RADIUS_M, longitude, 0.0);
    KeplerWorld::new(body, chaser, target, 0.0)
}

#[test]
fn orbit_raise_below_target() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let body = CelestialBody::kerbin();
    let gm = body.gm_m3_s2;
    let chaser = KeplerOrbit::circular(gm, 800e3, 1.0, 0.0);
    let target = KeplerOrbit::circular(gm, TARGET_RADIUS_M, 2.0, 0.0);
    let world = KeplerWorld::new(body.clone(), chaser, target, 0.0);
    let gnc = gnc(&body);
    let (chaser_view, target_view) = (world.orbit(Vessel::Chaser), world.orbit(Vessel::Target));
    let ctx = MissionContext::new(&world, &chaser_view, &target_view, &body, &gnc, &());

    let mut raise = OrbitRaise::new(DESIRED_APOAPSIS_M);
    let planned = raise.plan(&ctx);
    // Burn where the chaser crosses the periapsis direction of the target
    assert_relative_eq!(planned.ut, (TAU - 1.0) / chaser.mean_motion(), max_relative = 1e-12);
    assert_eq!(planned.direction, BurnDirection::Prograde);
    assert_eq!(planned.propulsion, Propulsion::MainEngine);
    let transfer_sma = (800e3 + DESIRED_APOAPSIS_M) / 2.0;
    assert_relative_eq!(
        planned.delta_v_m_s,
        body.orbital_velocity(800e3, transfer_sma) - body.orbital_velocity(800e3, 800e3),
        epsilon = 1e-9
    );

    raise.execute_phase(&ctx).unwrap();
    assert_eq!(raise.status(), PhaseStatus::Completed);
    assert_eq!(raise.maneuver(), Some(planned));

    let orbit = world.chaser();
    println!("raised orbit: {orbit}");
    assert_relative_eq!(orbit.periapsis(), 800e3, epsilon = 1.0);
    assert_relative_eq!(orbit.apoapsis(), DESIRED_APOAPSIS_M, epsilon = 1.0);
}

#[test]
fn phasing_fixed_orbits() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let world = phasing_world(10.0);
    let body = world.body().clone();
    let gnc = gnc(&body);
    let (chaser_view, target_view) = (world.orbit(Vessel::Chaser), world.orbit(Vessel::Target));
    let ctx = MissionContext::new(&world, &chaser_view, &target_view, &body, &gnc, &());

    let mut phasing = Phasing::new(DESIRED_APOAPSIS_M, 3.0, PhasingStrategy::Fixed { orbits: 3 });
    let solution = phasing.solve(&ctx).unwrap();
    println!("{solution}");
    assert!(solution.behind());
    assert_eq!(solution.orbits, 3);
    assert_relative_eq!(solution.phase_offset_rad, 7.0_f64.to_radians(), epsilon = 1e-9);
    let target_period = world.target().period();
    assert_relative_eq!(
        solution.time_difference_s,
        target_period * 7.0 / 360.0,
        max_relative = 1e-9
    );
    // Catching up on a shorter orbit
    assert!(solution.period_s < target_period);

    let chaser_period = world.chaser().period();
    phasing.execute_phase(&ctx).unwrap();
    assert_eq!(phasing.status(), PhaseStatus::Completed);
    assert_eq!(phasing.solution(), Some(solution));

    let burns = world.executed_maneuvers();
    assert_eq!(burns.len(), 2);
    assert_relative_eq!(burns[0].ut, chaser_period / 2.0, max_relative = 1e-12);
    assert_relative_eq!(
        burns[1].ut - burns[0].ut,
        3.0 * solution.period_s,
        max_relative = 1e-9
    );
    // The phasing orbit raises the periapsis towards the target orbit
    assert!(burns[0].delta_v_m_s > 0.0);
    assert!(burns[1].delta_v_m_s > 0.0);

    // Circular just below the target, which leads by the final phase angle
    let orbit = world.chaser();
    println!("final orbit: {orbit}");
    assert_relative_eq!(orbit.periapsis(), DESIRED_APOAPSIS_M, epsilon = 1.0);
    assert_relative_eq!(orbit.apoapsis(), DESIRED_APOAPSIS_M, epsilon = 1.0);
    assert_relative_eq!(world.phase_angle(), 3.0_f64.to_radians(), epsilon = 1e-6);
    assert_relative_eq!(world.ut(), burns[1].ut);
}

#[test]
fn phasing_safety_bounds() {
    let world = phasing_world(-147.0);
    let body = world.body().clone();
    let gnc = gnc(&body);
    let (chaser_view, target_view) = (world.orbit(Vessel::Chaser), world.orbit(Vessel::Target));
    let ctx = MissionContext::new(&world, &chaser_view, &target_view, &body, &gnc, &());

    let bounded = |max_orbits| {
        Phasing::new(
            DESIRED_APOAPSIS_M,
            3.0,
            PhasingStrategy::SafetyBounded {
                min_altitude_m: 100e3,
                max_apoapsis_factor: 1.3,
                max_orbits,
            },
        )
    };

    // A single phasing orbit would climb too high above the target
    let solution = bounded(10).solve(&ctx).unwrap();
    println!("{solution}");
    assert!(!solution.behind());
    assert_relative_eq!(solution.phase_offset_rad, -150.0_f64.to_radians(), epsilon = 1e-9);
    assert_eq!(solution.orbits, 2);
    assert!(solution.period_s > world.target().period());
    let other_apsis = body.apsis_from_period_and_apsis(solution.period_s, DESIRED_APOAPSIS_M);
    assert!(other_apsis > TARGET_RADIUS_M && other_apsis < 1.3 * TARGET_RADIUS_M);

    match bounded(1).solve(&ctx) {
        Err(PhaseError::PhasingBoundsUnreachable {
            max_orbits,
            apsis_m,
        }) => {
            assert_eq!(max_orbits, 1);
            assert!(apsis_m > 1.3 * TARGET_RADIUS_M);
        }
        other => panic!("expected the safety bounds to be unreachable, got {other:?}"),
    }

    // The fixed strategy keeps its number of orbits
    let fixed = Phasing::new(DESIRED_APOAPSIS_M, 3.0, PhasingStrategy::Fixed { orbits: 3 });
    assert_eq!(fixed.solve(&ctx).unwrap().orbits, 3);
}

#[test]
fn orbit_raise_then_phasing() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let body = CelestialBody::kerbin();
    let gm = body.gm_m3_s2;
    let world = KeplerWorld::new(
        body.clone(),
        KeplerOrbit::circular(gm, 800e3, 0.5, 0.0),
        KeplerOrbit::circular(gm, TARGET_RADIUS_M, 2.0, 0.0),
        0.0,
    );
    let gnc = gnc(&body);
    let (chaser_view, target_view) = (world.orbit(Vessel::Chaser), world.orbit(Vessel::Target));
    let ctx = MissionContext::new(&world, &chaser_view, &target_view, &body, &gnc, &());

    let mut mission = Mission::from_phases(vec![
        OrbitRaise::new(DESIRED_APOAPSIS_M).into(),
        Phasing::new(DESIRED_APOAPSIS_M, 3.0, PhasingStrategy::default()).into(),
    ])
    .unwrap();
    mission.run(&ctx).unwrap();

    assert_eq!(
        mission.statuses(),
        vec![
            (PhaseKind::OrbitRaise, PhaseStatus::Completed),
            (PhaseKind::Phasing, PhaseStatus::Completed),
        ]
    );
    assert_eq!(world.executed_maneuvers().len(), 3);

    let orbit = world.chaser();
    println!("final orbit: {orbit}");
    assert_relative_eq!(orbit.periapsis(), DESIRED_APOAPSIS_M, epsilon = 1.0);
    assert_relative_eq!(orbit.apoapsis(), DESIRED_APOAPSIS_M, epsilon = 1.0);
    assert_relative_eq!(world.phase_angle(), 3.0_f64.to_radians(), epsilon = 1e-6);
}
