extern crate nyx_rendezvous as rdv;

use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rdv::guidance::{ClosedFormGuidance, Guidance, GuidanceError, SmoothGuidance};
use rdv::linalg::Vector3;
use rdv::sim::RelativeMotionSim;
use rdv::vessel::{MissionClock, TelemetrySource};
use rdv::RelativeState;
use rstest::*;

#[test]
fn smooth_boundary_conditions() {
    let mut rng = Pcg64::seed_from_u64(2024);
    let positions = Uniform::new(-2000.0, 2000.0);
    let durations = Uniform::new(1.0, 600.0);

    let mut guid = SmoothGuidance::default();
    for _ in 0..200 {
        let initial = Vector3::from_fn(|_, _| positions.sample(&mut rng));
        let target = Vector3::from_fn(|_, _| positions.sample(&mut rng));
        let duration = durations.sample(&mut rng);
        guid.configure(initial, target, duration).unwrap();

        let start = guid.reference(0.0).unwrap();
        assert!((start.position() - initial).norm() < 1e-9);
        assert_eq!(start.velocity(), Vector3::zeros());

        let end = guid.reference(1.0).unwrap();
        assert!((end.position() - target).norm() < 1e-9);
        assert!(end.velocity().norm() < 1e-9);
        assert!(guid.acceleration(1.0).unwrap().norm() < 1e-9);

        // Held past the end
        assert_eq!(guid.reference(1.7).unwrap(), end);
        assert_eq!(guid.reference(-0.2).unwrap(), start);

        // Half way on every axis, at peak velocity
        let mid = guid.reference(0.5).unwrap();
        assert!((mid.position() - (initial + target) / 2.0).norm() < 1e-9);
        assert!((mid.velocity() - (target - initial) * 1.875 / duration).norm() < 1e-9);
    }

    assert!(matches!(
        guid.reference(f64::NAN),
        Err(GuidanceError::InvalidTime { .. })
    ));
}

#[rstest]
#[case(Vector3::new(200.0, 0.0, 0.0), Vector3::new(0.0, 0.3, 0.0))]
#[case(Vector3::new(-50.0, 800.0, 10.0), Vector3::new(0.05, -0.2, 0.0))]
#[case(Vector3::new(0.0, -3000.0, -25.0), Vector3::new(0.0, 0.0, 0.02))]
fn closed_form_matches_propagation(#[case] r0: Vector3<f64>, #[case] v0: Vector3<f64>) {
    let (earth, radius) = crate::scenario_orbit();
    let sim = RelativeMotionSim::new(earth, radius, RelativeState::from_cartesian(r0, v0)).unwrap();
    let guid = ClosedFormGuidance::new(sim.orbital_rate(), r0, v0).unwrap();

    // Determinism at the initial time
    assert_eq!(guid.reference(0.0).unwrap(), guid.reference(0.0).unwrap());
    assert!((guid.reference(0.0).unwrap().position() - r0).norm() < 1e-9);

    for _ in 0..10 {
        sim.wait(300.0);
        let expected = guid.reference(sim.ut()).unwrap();
        let state = sim.state();
        assert!(
            (state.position() - expected.position()).norm() < 1e-3,
            "at {} s: {state} instead of {expected}",
            sim.ut()
        );
        assert!((state.velocity() - expected.velocity()).norm() < 1e-6);
    }

    assert!(matches!(
        guid.reference(-1.0),
        Err(GuidanceError::InvalidTime { .. })
    ));
}
