/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::Vessel;
use crate::cosmic::CelestialBody;
use crate::linalg::{Vector2, Vector3};
use crate::vessel::{
    ActuationFailedSnafu, ActuationSink, BurnDirection, Frame, FrameTransform, ManeuverExecutor,
    ManeuverFailedSnafu, ManeuverNode, MissionClock, NodeInPastSnafu, OrbitQuery,
    TelemetrySource, VesselError,
};
use snafu::ensure;
use std::cell::{Cell, RefCell};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Eccentricities below this are treated as circular, the argument of periapsis being set to zero.
const CIRCULAR_ECC: f64 = 1e-10;

/// Closed elliptical orbit in the equatorial plane, propagated analytically.
///
/// Angles are measured from the inertial X axis, counter clockwise, so the argument of periapsis is the
/// longitude of the periapsis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct KeplerOrbit {
    pub gm_m3_s2: f64,
    pub sma_m: f64,
    pub ecc: f64,
    pub aop_rad: f64,
    /// Mean anomaly at the epoch
    pub mean_anomaly_rad: f64,
    pub epoch_s: f64,
}

impl KeplerOrbit {
    pub fn circular(gm_m3_s2: f64, radius_m: f64, longitude_rad: f64, epoch_s: f64) -> Self {
        Self {
            gm_m3_s2,
            sma_m: radius_m,
            ecc: 0.0,
            aop_rad: 0.0,
            mean_anomaly_rad: longitude_rad,
            epoch_s,
        }
    }

    /// Orbit of periapsis `rp_m` and apoapsis `ra_m`, the vessel being at periapsis at the epoch.
    pub fn from_apsides(
        gm_m3_s2: f64,
        rp_m: f64,
        ra_m: f64,
        aop_rad: f64,
        epoch_s: f64,
    ) -> Self {
        Self {
            gm_m3_s2,
            sma_m: (rp_m + ra_m) / 2.0,
            ecc: (ra_m - rp_m) / (ra_m + rp_m),
            aop_rad,
            mean_anomaly_rad: 0.0,
            epoch_s,
        }
    }

    /// Osculating orbit of a prograde planar state.
    pub fn from_state(gm_m3_s2: f64, r: Vector2<f64>, v: Vector2<f64>, epoch_s: f64) -> Self {
        let r_norm = r.norm();
        let v2 = v.norm_squared();
        let sma_m = 1.0 / (2.0 / r_norm - v2 / gm_m3_s2);
        let ecc_vec = ((v2 - gm_m3_s2 / r_norm) * r - r.dot(&v) * v) / gm_m3_s2;
        let mut ecc = ecc_vec.norm();
        let aop_rad = if ecc < CIRCULAR_ECC {
            ecc = 0.0;
            0.0
        } else {
            ecc_vec.y.atan2(ecc_vec.x).rem_euclid(TAU)
        };
        let true_anomaly = (r.y.atan2(r.x) - aop_rad).rem_euclid(TAU);
        Self {
            gm_m3_s2,
            sma_m,
            ecc,
            aop_rad,
            mean_anomaly_rad: mean_from_true(true_anomaly, ecc),
            epoch_s,
        }
    }

    pub fn mean_motion(&self) -> f64 {
        (self.gm_m3_s2 / self.sma_m.powi(3)).sqrt()
    }

    pub fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    pub fn periapsis(&self) -> f64 {
        self.sma_m * (1.0 - self.ecc)
    }

    pub fn apoapsis(&self) -> f64 {
        self.sma_m * (1.0 + self.ecc)
    }

    pub fn true_anomaly_at(&self, t_s: f64) -> f64 {
        let mean = self.mean_anomaly_rad + self.mean_motion() * (t_s - self.epoch_s);
        let ea = solve_kepler(mean, self.ecc);
        true_from_eccentric(ea, self.ecc)
    }

    pub fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.sma_m * (1.0 - self.ecc.powi(2)) / (1.0 + self.ecc * true_anomaly.cos())
    }

    /// First time, at or after `after_s`, at which the true anomaly is reached.
    pub fn time_at_true_anomaly(&self, true_anomaly: f64, after_s: f64) -> f64 {
        let n = self.mean_motion();
        let mean_now = self.mean_anomaly_rad + n * (after_s - self.epoch_s);
        let delta = (mean_from_true(true_anomaly, self.ecc) - mean_now).rem_euclid(TAU);
        after_s + delta / n
    }

    /// Inertial position and velocity at time `t_s`.
    pub fn state_at(&self, t_s: f64) -> (Vector2<f64>, Vector2<f64>) {
        let nu = self.true_anomaly_at(t_s);
        let p = self.sma_m * (1.0 - self.ecc.powi(2));
        let r = p / (1.0 + self.ecc * nu.cos());
        let (sin_l, cos_l) = (nu + self.aop_rad).sin_cos();
        let (sin_w, cos_w) = self.aop_rad.sin_cos();
        let vc = (self.gm_m3_s2 / p).sqrt();
        (
            Vector2::new(r * cos_l, r * sin_l),
            Vector2::new(-vc * (sin_l + self.ecc * sin_w), vc * (cos_l + self.ecc * cos_w)),
        )
    }
}

impl fmt::Display for KeplerOrbit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "sma = {:.1} m, ecc = {:.6}, aop = {:.3} deg",
            self.sma_m,
            self.ecc,
            self.aop_rad.to_degrees()
        )
    }
}

fn mean_from_true(true_anomaly: f64, ecc: f64) -> f64 {
    let ea = ((1.0 - ecc.powi(2)).sqrt() * true_anomaly.sin()).atan2(ecc + true_anomaly.cos());
    (ea - ecc * ea.sin()).rem_euclid(TAU)
}

fn true_from_eccentric(ea: f64, ecc: f64) -> f64 {
    ((1.0 - ecc.powi(2)).sqrt() * ea.sin())
        .atan2(ea.cos() - ecc)
        .rem_euclid(TAU)
}

/// Newton iterations on Kepler's equation.
fn solve_kepler(mean: f64, ecc: f64) -> f64 {
    let mean = mean.rem_euclid(TAU);
    let mut ea = if ecc < 0.8 { mean } else { PI };
    for _ in 0..50 {
        let delta = (ea - ecc * ea.sin() - mean) / (1.0 - ecc * ea.cos());
        ea -= delta;
        if delta.abs() < 1e-14 {
            break;
        }
    }
    ea
}

/// Two vessels on planar Kepler orbits about the same body.
///
/// Impulsive maneuvers change the orbit of the chaser. RCS commands are integrated as an impulse at the start
/// of each wait, which is accurate enough for the short control periods of the closed loop phases.
pub struct KeplerWorld {
    body: CelestialBody,
    ut: Cell<f64>,
    chaser: Cell<KeplerOrbit>,
    target: KeplerOrbit,
    command: Cell<Vector3<f64>>,
    warp: Cell<u32>,
    executed: RefCell<Vec<ManeuverNode>>,
}

impl KeplerWorld {
    pub fn new(body: CelestialBody, chaser: KeplerOrbit, target: KeplerOrbit, ut: f64) -> Self {
        Self {
            body,
            ut: Cell::new(ut),
            chaser: Cell::new(chaser),
            target,
            command: Cell::new(Vector3::zeros()),
            warp: Cell::new(0),
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn body(&self) -> &CelestialBody {
        &self.body
    }

    pub fn chaser(&self) -> KeplerOrbit {
        self.chaser.get()
    }

    pub fn target(&self) -> KeplerOrbit {
        self.target
    }

    pub fn executed_maneuvers(&self) -> Vec<ManeuverNode> {
        self.executed.borrow().clone()
    }

    pub fn orbit(&self, vessel: Vessel) -> KeplerOrbitView<'_> {
        KeplerOrbitView {
            world: self,
            vessel,
        }
    }

    /// Angle (rad, in [-pi, pi)) by which the target leads the chaser.
    pub fn phase_angle(&self) -> f64 {
        let t = self.ut.get();
        let (rc, _) = self.chaser.get().state_at(t);
        let (rt, _) = self.target.state_at(t);
        (rt.y.atan2(rt.x) - rc.y.atan2(rc.x) + PI).rem_euclid(TAU) - PI
    }

    /// Local orbital frame of the target: anti-radial, along-track unit vectors and the frame rotation rate.
    fn target_frame(&self, t: f64) -> (Vector2<f64>, Vector2<f64>, f64) {
        let (r, v) = self.target.state_at(t);
        let r_hat = r.normalize();
        let h = r.x * v.y - r.y * v.x;
        let along = Vector2::new(-r_hat.y, r_hat.x);
        (-r_hat, along, h / r.norm_squared())
    }

    /// Adds an orbital frame delta-v, expressed in the local frame of the chaser, to the chaser orbit.
    fn apply_impulse(&self, orbital_dv: Vector3<f64>) {
        let t = self.ut.get();
        let (r, v) = self.chaser.get().state_at(t);
        let radial_out = r.normalize();
        let along = Vector2::new(-radial_out.y, radial_out.x);
        let dv = -orbital_dv.x * radial_out + orbital_dv.y * along;
        self.chaser
            .set(KeplerOrbit::from_state(self.body.gm_m3_s2, r, v + dv, t));
    }
}

impl TelemetrySource for KeplerWorld {
    fn ut(&self) -> f64 {
        self.ut.get()
    }

    fn relative_position(&self) -> Vector3<f64> {
        let t = self.ut.get();
        let (rc, _) = self.chaser.get().state_at(t);
        let (rt, _) = self.target.state_at(t);
        let (x_hat, y_hat, _) = self.target_frame(t);
        let rel = rc - rt;
        Vector3::new(rel.dot(&x_hat), rel.dot(&y_hat), 0.0)
    }

    fn relative_velocity(&self) -> Vector3<f64> {
        let t = self.ut.get();
        let (rc, vc) = self.chaser.get().state_at(t);
        let (rt, vt) = self.target.state_at(t);
        let (x_hat, y_hat, omega) = self.target_frame(t);
        let rel = rc - rt;
        // Velocity seen from the rotating frame
        let rel_v = (vc - vt) - omega * Vector2::new(-rel.y, rel.x);
        Vector3::new(rel_v.dot(&x_hat), rel_v.dot(&y_hat), 0.0)
    }
}

impl MissionClock for KeplerWorld {
    fn wait(&self, seconds: f64) {
        let command = self.command.get();
        if command != Vector3::zeros() && seconds > 0.0 {
            self.apply_impulse(command * seconds);
        }
        self.ut.set(self.ut.get() + seconds.max(0.0));
    }

    fn set_warp(&self, factor: u32) {
        self.warp.set(factor);
    }

    fn warp_to(&self, ut: f64) {
        self.ut.set(self.ut.get().max(ut));
    }
}

impl ManeuverExecutor for KeplerWorld {
    fn execute_node(&self, node: &ManeuverNode) -> Result<(), VesselError> {
        let now = self.ut.get();
        ensure!(
            node.ut >= now - 1e-6,
            NodeInPastSnafu {
                node_ut: node.ut,
                now
            }
        );
        ensure!(
            node.direction != BurnDirection::Normal,
            ManeuverFailedSnafu {
                delta_v_m_s: node.delta_v_m_s,
                direction: node.direction,
                reason: "planar orbits only"
            }
        );
        self.command.set(Vector3::zeros());
        self.ut.set(node.ut.max(now));
        self.apply_impulse(node.delta_v_vector());
        debug!("executed {node}, chaser orbit {}", self.chaser.get());
        self.executed.borrow_mut().push(*node);
        Ok(())
    }
}

impl ActuationSink for KeplerWorld {
    fn apply(&self, body_command: Vector3<f64>) -> Result<(), VesselError> {
        ensure!(
            body_command.iter().all(|u| u.is_finite()),
            ActuationFailedSnafu {
                reason: format!("non finite command {body_command:?}")
            }
        );
        self.command.set(body_command);
        Ok(())
    }
}

/// The body frame of the chaser is aligned with its local orbital frame.
impl FrameTransform for KeplerWorld {
    fn transform(&self, vector: Vector3<f64>, _from: Frame, _to: Frame) -> Vector3<f64> {
        vector
    }
}

pub struct KeplerOrbitView<'a> {
    world: &'a KeplerWorld,
    vessel: Vessel,
}

impl KeplerOrbitView<'_> {
    fn orbit(&self) -> KeplerOrbit {
        match self.vessel {
            Vessel::Chaser => self.world.chaser.get(),
            Vessel::Target => self.world.target,
        }
    }
}

impl OrbitQuery for KeplerOrbitView<'_> {
    fn periapsis(&self) -> f64 {
        self.orbit().periapsis()
    }

    fn apoapsis(&self) -> f64 {
        self.orbit().apoapsis()
    }

    fn semi_major_axis(&self) -> f64 {
        self.orbit().sma_m
    }

    fn eccentricity(&self) -> f64 {
        self.orbit().ecc
    }

    fn argument_of_periapsis(&self) -> f64 {
        self.orbit().aop_rad
    }

    fn longitude_of_ascending_node(&self) -> f64 {
        0.0
    }

    fn period(&self) -> f64 {
        self.orbit().period()
    }

    fn radius(&self) -> f64 {
        self.orbit().state_at(self.world.ut.get()).0.norm()
    }

    fn true_anomaly_at_ut(&self, ut: f64) -> f64 {
        self.orbit().true_anomaly_at(ut)
    }

    fn ut_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.orbit()
            .time_at_true_anomaly(true_anomaly, self.world.ut.get())
    }

    fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.orbit().radius_at_true_anomaly(true_anomaly)
    }

    fn time_to_apoapsis(&self) -> f64 {
        self.ut_at_true_anomaly(PI) - self.world.ut.get()
    }

    fn time_to_periapsis(&self) -> f64 {
        self.ut_at_true_anomaly(0.0) - self.world.ut.get()
    }
}

#[cfg(test)]
mod ut_kepler {
    use super::*;
    use crate::vessel::Propulsion;
    use approx::assert_relative_eq;

    fn kerbin_gm() -> f64 {
        CelestialBody::kerbin().gm_m3_s2
    }

    #[test]
    fn state_round_trip() {
        let orbit = KeplerOrbit::from_apsides(kerbin_gm(), 800e3, 900e3, 0.7, 0.0);
        for t in [0.0, 500.0, 1234.5, 4000.0] {
            let (r, v) = orbit.state_at(t);
            let osc = KeplerOrbit::from_state(kerbin_gm(), r, v, t);
            assert_relative_eq!(osc.sma_m, orbit.sma_m, max_relative = 1e-9);
            assert_relative_eq!(osc.ecc, orbit.ecc, epsilon = 1e-9);
            assert_relative_eq!(osc.aop_rad, orbit.aop_rad, epsilon = 1e-7);
            let (r2, v2) = osc.state_at(t + 100.0);
            let (r1, v1) = orbit.state_at(t + 100.0);
            assert!((r2 - r1).norm() < 1e-3);
            assert!((v2 - v1).norm() < 1e-6);
        }
    }

    #[test]
    fn apsides_timing() {
        let orbit = KeplerOrbit::from_apsides(kerbin_gm(), 800e3, 900e3, 0.0, 0.0);
        assert_relative_eq!(orbit.true_anomaly_at(0.0), 0.0, epsilon = 1e-12);
        let t_apo = orbit.time_at_true_anomaly(PI, 0.0);
        assert_relative_eq!(t_apo, orbit.period() / 2.0, max_relative = 1e-12);
        assert_relative_eq!(orbit.state_at(t_apo).0.norm(), 900e3, max_relative = 1e-12);
        assert_relative_eq!(orbit.radius_at_true_anomaly(PI), 900e3, max_relative = 1e-12);
        // Next periapsis is a full period later
        let t_peri = orbit.time_at_true_anomaly(0.0, 1.0);
        assert_relative_eq!(t_peri, orbit.period(), max_relative = 1e-12);
    }

    #[test]
    fn impulses_and_relative_state() {
        let body = CelestialBody::kerbin();
        let gm = body.gm_m3_s2;
        let chaser = KeplerOrbit::circular(gm, 898e3, 0.0, 0.0);
        let target = KeplerOrbit::circular(gm, 900e3, 0.001, 0.0);
        let world = KeplerWorld::new(body, chaser, target, 0.0);

        // Chaser below and behind the target
        let r = world.relative_position();
        assert!((r.x - 2000.0).abs() < 1.0);
        assert!(r.y < -800.0);
        // Below target drifts forward at 1.5 n x
        let v = world.relative_velocity();
        let n = target.mean_motion();
        assert!((v.y - 1.5 * n * 2000.0).abs() < 0.05);
        assert!(world.phase_angle() > 0.0);

        let node = ManeuverNode::new(10.0, 5.0, BurnDirection::Prograde, Propulsion::MainEngine);
        world.execute_node(&node).unwrap();
        assert_eq!(world.ut(), 10.0);
        assert!(world.chaser().apoapsis() > 898e3 + 1e3);
        assert_relative_eq!(world.chaser().periapsis(), 898e3, max_relative = 1e-9);

        let normal = ManeuverNode::new(20.0, 1.0, BurnDirection::Normal, Propulsion::MainEngine);
        assert!(world.execute_node(&normal).is_err());
        let past = ManeuverNode::new(5.0, 1.0, BurnDirection::Prograde, Propulsion::MainEngine);
        assert_eq!(
            world.execute_node(&past),
            Err(VesselError::NodeInPast {
                node_ut: 5.0,
                now: 10.0
            })
        );
    }
}
