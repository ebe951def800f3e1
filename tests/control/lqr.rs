extern crate nyx_rendezvous as rdv;

use approx::assert_relative_eq;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rdv::control::{ControlError, Controller, CostWeights, Lqr};
use rdv::dynamics::{InPlaneDynamics, LinearDynamics, OutOfPlaneDynamics};
use rdv::linalg::{Matrix4, Matrix4x1, Vector3, Vector4};
use rdv::md::Gnc;
use rdv::sim::RelativeMotionSim;
use rdv::vessel::{ActuationSink, MissionClock};
use rdv::RelativeState;
use rstest::*;

#[rstest]
#[case(1e-5)]
#[case(1e-4)]
#[case(1e-3)]
#[case(1e-2)]
#[case(1e-1)]
fn lqr_synthesis_any_rate(#[case] n: f64) {
    let costs = CostWeights::default();

    let in_plane = InPlaneDynamics::new(n).unwrap();
    assert_eq!(in_plane.controllability_matrix().rank(1e-9), 4);
    let lqr = Lqr::synthesize(&in_plane, costs).unwrap();
    println!("n = {n:e}: {lqr}");

    // The closed loop is stable
    let closed = in_plane.free_dynamics() - in_plane.control_input() * lqr.gain();
    for eig in closed.complex_eigenvalues().iter() {
        assert!(eig.re < 0.0, "unstable in-plane closed loop pole {eig} for n = {n:e}");
    }

    // And P solves the Riccati equation
    let a = in_plane.free_dynamics();
    let b = in_plane.control_input();
    let p = lqr.riccati();
    let residual = a.transpose() * p + p * a - p * b * b.transpose() * p / costs.control_weight
        + Matrix4::identity() * costs.state_weight;
    assert!(
        residual.norm() < 1e-5 * (p.norm() + costs.state_weight),
        "Riccati residual {:e} for n = {n:e}",
        residual.norm()
    );

    let out_of_plane = OutOfPlaneDynamics::new(n).unwrap();
    assert_eq!(out_of_plane.controllability_matrix().rank(1e-9), 2);
    let lqr = Lqr::synthesize(&out_of_plane, costs).unwrap();
    let closed = out_of_plane.free_dynamics() - out_of_plane.control_input() * lqr.gain();
    for eig in closed.complex_eigenvalues().iter() {
        assert!(eig.re < 0.0, "unstable out-of-plane closed loop pole {eig} for n = {n:e}");
    }
}

#[test]
fn lqr_linearity() {
    let lqr =
        Lqr::synthesize(&InPlaneDynamics::new(1e-3).unwrap(), CostWeights::default())
            .unwrap();
    let mut rng = Pcg64::seed_from_u64(7);
    let dist = Uniform::new(-100.0, 100.0);

    for _ in 0..100 {
        let mut sample = || Vector4::from_fn(|_, _| dist.sample(&mut rng));
        let (s1, r1, s2, r2) = (sample(), sample(), sample(), sample());
        let (a, b) = (dist.sample(&mut rng) / 10.0, dist.sample(&mut rng) / 10.0);
        let combined = lqr.control(&(a * s1 + b * s2), &(a * r1 + b * r2));
        let separate = a * lqr.control(&s1, &r1) + b * lqr.control(&s2, &r2);
        assert!((combined - separate).norm() <= 1e-9 * (1.0 + separate.norm()));
        // Only the error matters
        assert_eq!(lqr.control(&s1, &s1), lqr.control(&r1, &r1));
    }
}

#[test]
fn lqr_regulation() {
    if pretty_env_logger::try_init().is_err() {
        println!("could not init env_logger");
    }

    let (earth, radius) = crate::scenario_orbit();
    let gnc = Gnc::synthesize(crate::SCENARIO_RATE, CostWeights::new(1e3, 1e5)).unwrap();
    let sim = RelativeMotionSim::new(
        earth,
        radius,
        RelativeState::from_cartesian(Vector3::new(100.0, 0.0, 0.0), Vector3::zeros()),
    )
    .unwrap()
    .with_step(0.01);

    let dt = 0.01;
    let reference = RelativeState::default();
    let mut prev_cost = f64::INFINITY;
    for _ in 0..20_000 {
        let state = sim.state();
        let cost = gnc.in_plane.cost_to_go(&state.in_plane);
        assert!(
            cost <= prev_cost * (1.0 + 1e-9) + 1e-12,
            "cost to go increased from {prev_cost} to {cost}"
        );
        prev_cost = cost;

        sim.apply(gnc.command(&state, &reference)).unwrap();
        sim.wait(dt);
    }

    let state = sim.state();
    println!("final state: {state}");
    assert!(state.position().norm() < 0.5);
    assert_relative_eq!(state.out_of_plane.norm(), 0.0);
}

/// In-plane Clohessy-Wiltshire motion with a single, configurable, thrust direction.
struct SingleAxisThrust {
    n: f64,
    input: Matrix4x1<f64>,
}

impl LinearDynamics<4, 1> for SingleAxisThrust {
    fn free_dynamics(&self) -> Matrix4<f64> {
        InPlaneDynamics::new(self.n).unwrap().free_dynamics()
    }

    fn control_input(&self) -> Matrix4x1<f64> {
        self.input
    }

    fn orbital_rate(&self) -> f64 {
        self.n
    }
}

/// Two decoupled double integrators, only the first one is actuated.
struct DecoupledAxes;

impl LinearDynamics<4, 1> for DecoupledAxes {
    fn free_dynamics(&self) -> Matrix4<f64> {
        Matrix4::new(
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0,
        )
    }

    fn control_input(&self) -> Matrix4x1<f64> {
        Matrix4x1::new(0.0, 0.0, 1.0, 0.0)
    }

    fn orbital_rate(&self) -> f64 {
        0.0
    }
}

#[test]
fn lqr_uncontrollable() {
    let costs = CostWeights::default();

    let unactuated = SingleAxisThrust {
        n: 1e-3,
        input: Matrix4x1::zeros(),
    };
    assert_eq!(
        Lqr::synthesize(&unactuated, costs),
        Err(ControlError::Uncontrollable {
            rank: 0,
            expected: 4
        })
    );

    // Radial thrust alone cannot correct an along-track offset
    let radial_only = SingleAxisThrust {
        n: 1e-3,
        input: Matrix4x1::new(0.0, 0.0, 1.0, 0.0),
    };
    assert_eq!(
        Lqr::synthesize(&radial_only, costs),
        Err(ControlError::Uncontrollable {
            rank: 3,
            expected: 4
        })
    );

    assert_eq!(
        Lqr::synthesize(&DecoupledAxes, costs),
        Err(ControlError::Uncontrollable {
            rank: 2,
            expected: 4
        })
    );
}
