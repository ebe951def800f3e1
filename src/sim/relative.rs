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

use super::{rk4_step, substeps, Vessel};
use crate::cosmic::CelestialBody;
use crate::dynamics::{InPlaneDynamics, OutOfPlaneDynamics};
use crate::errors::RendezvousError;
use crate::io::{ConfigError, InvalidConfigSnafu, NoiseSettings, ScenarioConfig};
use crate::linalg::{Vector1, Vector2, Vector3};
use crate::state::RelativeState;
use crate::vessel::{
    ActuationFailedSnafu, ActuationSink, AttitudeMode, Frame, FrameTransform, ManeuverExecutor,
    ManeuverNode, MissionClock, NodeInPastSnafu, OrbitQuery, SpeedMode, TelemetrySource,
    VesselError,
};
use nalgebra::Rotation3;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64;
use snafu::ensure;
use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;

struct TelemetryNoise {
    rng: Pcg64,
    position: Normal<f64>,
    velocity: Normal<f64>,
}

/// Simulates the relative motion of the chaser about a target on a circular orbit, with the linearized
/// Clohessy-Wiltshire equations.
///
/// Time only advances through the [`MissionClock`] and [`ManeuverExecutor`] calls, so that a full mission runs
/// as fast as the integration allows. Impulsive maneuvers are applied instantaneously, RCS commands are held
/// constant until the next command.
pub struct RelativeMotionSim {
    body: CelestialBody,
    target_radius_m: f64,
    in_plane: InPlaneDynamics,
    out_of_plane: OutOfPlaneDynamics,
    step_s: f64,
    ut: Cell<f64>,
    state: Cell<RelativeState>,
    /// Held command in the orbital frame (m/s^2)
    command: Cell<Vector3<f64>>,
    warp: Cell<u32>,
    body_from_orbital: Rotation3<f64>,
    max_accel_m_s2: Option<f64>,
    noise: Option<RefCell<TelemetryNoise>>,
    executed: RefCell<Vec<ManeuverNode>>,
}

impl RelativeMotionSim {
    /// Target on a circular orbit of radius `target_radius_m`, chaser at `initial` relative to it.
    pub fn new(
        body: CelestialBody,
        target_radius_m: f64,
        initial: RelativeState,
    ) -> Result<Self, RendezvousError> {
        let n = body.orbital_rate(target_radius_m);
        Ok(Self {
            in_plane: InPlaneDynamics::new(n)?,
            out_of_plane: OutOfPlaneDynamics::new(n)?,
            body,
            target_radius_m,
            step_s: 0.05,
            ut: Cell::new(0.0),
            state: Cell::new(initial),
            command: Cell::new(Vector3::zeros()),
            warp: Cell::new(0),
            body_from_orbital: Rotation3::identity(),
            max_accel_m_s2: None,
            noise: None,
            executed: RefCell::new(Vec::new()),
        })
    }

    /// Builds the simulation from a scenario: the target orbit radius is the semi-major axis of the scenario.
    pub fn from_scenario(
        body: CelestialBody,
        scenario: &ScenarioConfig,
    ) -> Result<Self, RendezvousError> {
        ensure!(
            scenario.target_sma_m > body.equatorial_radius_m,
            InvalidConfigSnafu {
                msg: format!(
                    "target orbit radius {} m is below the surface of {}",
                    scenario.target_sma_m, body.name
                )
            }
        );
        let initial = RelativeState::from_cartesian(
            Vector3::from(scenario.initial_position_m),
            Vector3::from(scenario.initial_velocity_m_s),
        );
        let mut sim = Self::new(body, scenario.target_sma_m, initial)?
            .with_step(scenario.integration_step.to_seconds())
            .with_body_yaw(scenario.body_yaw_deg);
        if let Some(max_accel) = scenario.rcs_max_accel_m_s2 {
            sim = sim.with_max_acceleration(max_accel);
        }
        if let Some(noise) = scenario.nav_noise {
            sim = sim.with_noise(noise)?;
        }
        Ok(sim)
    }

    pub fn with_step(mut self, step_s: f64) -> Self {
        if step_s > 0.0 {
            self.step_s = step_s;
        } else {
            warn!("ignoring non positive integration step of {step_s} s");
        }
        self
    }

    /// Rotates the body frame about the cross-track axis.
    pub fn with_body_yaw(mut self, yaw_deg: f64) -> Self {
        self.body_from_orbital =
            Rotation3::from_axis_angle(&Vector3::z_axis(), yaw_deg.to_radians());
        self
    }

    /// Saturates the RCS command on each body axis.
    pub fn with_max_acceleration(mut self, max_accel_m_s2: f64) -> Self {
        self.max_accel_m_s2 = Some(max_accel_m_s2.abs());
        self
    }

    pub fn with_noise(mut self, noise: NoiseSettings) -> Result<Self, ConfigError> {
        let position =
            Normal::new(0.0, noise.position_sigma_m).map_err(|e| ConfigError::InvalidConfig {
                msg: format!("position noise: {e}"),
            })?;
        let velocity =
            Normal::new(0.0, noise.velocity_sigma_m_s).map_err(|e| ConfigError::InvalidConfig {
                msg: format!("velocity noise: {e}"),
            })?;
        self.noise = Some(RefCell::new(TelemetryNoise {
            rng: Pcg64::seed_from_u64(noise.seed),
            position,
            velocity,
        }));
        Ok(self)
    }

    pub fn body(&self) -> &CelestialBody {
        &self.body
    }

    pub fn orbital_rate(&self) -> f64 {
        self.body.orbital_rate(self.target_radius_m)
    }

    pub fn target_radius(&self) -> f64 {
        self.target_radius_m
    }

    /// True relative state, without telemetry noise.
    pub fn state(&self) -> RelativeState {
        self.state.get()
    }

    pub fn held_command(&self) -> Vector3<f64> {
        self.command.get()
    }

    pub fn warp(&self) -> u32 {
        self.warp.get()
    }

    /// Maneuvers executed so far.
    pub fn executed_maneuvers(&self) -> Vec<ManeuverNode> {
        self.executed.borrow().clone()
    }

    pub fn orbit(&self, vessel: Vessel) -> RelativeOrbitView<'_> {
        RelativeOrbitView { sim: self, vessel }
    }

    /// Propagates the relative state by `duration_s`, holding the current command.
    pub fn propagate(&self, duration_s: f64) {
        if duration_s <= 0.0 {
            return;
        }
        let u = self.command.get();
        let u_in = Vector2::new(u.x, u.y);
        let u_out = Vector1::new(u.z);
        let mut state = self.state.get();
        for step in substeps(duration_s, self.step_s) {
            state.in_plane = rk4_step(&self.in_plane, &state.in_plane, &u_in, step);
            state.out_of_plane = rk4_step(&self.out_of_plane, &state.out_of_plane, &u_out, step);
        }
        self.state.set(state);
        self.ut.set(self.ut.get() + duration_s);
    }

    fn noisy(&self, mut vector: Vector3<f64>, position: bool) -> Vector3<f64> {
        if let Some(noise) = &self.noise {
            let mut noise = noise.borrow_mut();
            let TelemetryNoise {
                rng,
                position: pos_noise,
                velocity: vel_noise,
            } = &mut *noise;
            let dist = if position { pos_noise } else { vel_noise };
            for v in vector.iter_mut() {
                *v += dist.sample(rng);
            }
        }
        vector
    }
}

impl TelemetrySource for RelativeMotionSim {
    fn ut(&self) -> f64 {
        self.ut.get()
    }

    fn relative_position(&self) -> Vector3<f64> {
        self.noisy(self.state.get().position(), true)
    }

    fn relative_velocity(&self) -> Vector3<f64> {
        self.noisy(self.state.get().velocity(), false)
    }
}

impl MissionClock for RelativeMotionSim {
    fn wait(&self, seconds: f64) {
        self.propagate(seconds);
    }

    fn set_warp(&self, factor: u32) {
        debug!("time warp x{factor} at UT {:.1} s", self.ut.get());
        self.warp.set(factor);
    }

    fn warp_to(&self, ut: f64) {
        self.propagate(ut - self.ut.get());
    }
}

impl ManeuverExecutor for RelativeMotionSim {
    fn execute_node(&self, node: &ManeuverNode) -> Result<(), VesselError> {
        let now = self.ut.get();
        ensure!(
            node.ut >= now - 1e-9,
            NodeInPastSnafu {
                node_ut: node.ut,
                now
            }
        );
        // RCS translation stops while the node is executed
        self.command.set(Vector3::zeros());
        self.propagate(node.ut - now);

        let mut state = self.state.get();
        let dv = node.delta_v_vector();
        state.in_plane[2] += dv.x;
        state.in_plane[3] += dv.y;
        state.out_of_plane[1] += dv.z;
        self.state.set(state);
        debug!("executed {node}");
        self.executed.borrow_mut().push(*node);
        Ok(())
    }
}

impl ActuationSink for RelativeMotionSim {
    fn apply(&self, body_command: Vector3<f64>) -> Result<(), VesselError> {
        ensure!(
            body_command.iter().all(|u| u.is_finite()),
            ActuationFailedSnafu {
                reason: format!("non finite command {body_command:?}")
            }
        );
        let saturated = match self.max_accel_m_s2 {
            Some(max) => body_command.map(|u| u.clamp(-max, max)),
            None => body_command,
        };
        self.command
            .set(self.transform(saturated, Frame::Body, Frame::Orbital));
        Ok(())
    }

    fn engage(&self, attitude: AttitudeMode, speed: SpeedMode) -> Result<(), VesselError> {
        debug!("attitude hold {attitude:?} with {speed:?} speed reference");
        Ok(())
    }
}

impl FrameTransform for RelativeMotionSim {
    fn transform(&self, vector: Vector3<f64>, from: Frame, to: Frame) -> Vector3<f64> {
        match (from, to) {
            (Frame::Orbital, Frame::Body) => self.body_from_orbital * vector,
            (Frame::Body, Frame::Orbital) => self.body_from_orbital.inverse() * vector,
            _ => vector,
        }
    }
}

/// Circular orbit view of either vessel. The chaser is assumed on a circular orbit at its current radius,
/// which is all the homing phase needs.
pub struct RelativeOrbitView<'a> {
    sim: &'a RelativeMotionSim,
    vessel: Vessel,
}

impl RelativeOrbitView<'_> {
    fn mean_motion(&self) -> f64 {
        self.sim.body.orbital_rate(self.radius())
    }
}

impl OrbitQuery for RelativeOrbitView<'_> {
    fn periapsis(&self) -> f64 {
        self.radius()
    }

    fn apoapsis(&self) -> f64 {
        self.radius()
    }

    fn semi_major_axis(&self) -> f64 {
        self.radius()
    }

    fn eccentricity(&self) -> f64 {
        0.0
    }

    fn argument_of_periapsis(&self) -> f64 {
        0.0
    }

    fn longitude_of_ascending_node(&self) -> f64 {
        0.0
    }

    fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    fn radius(&self) -> f64 {
        match self.vessel {
            Vessel::Target => self.sim.target_radius_m,
            // The radial axis points down, towards the body
            Vessel::Chaser => self.sim.target_radius_m - self.sim.state.get().in_plane[0],
        }
    }

    fn true_anomaly_at_ut(&self, ut: f64) -> f64 {
        (self.mean_motion() * ut).rem_euclid(TAU)
    }

    fn ut_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        let now = self.sim.ut.get();
        let delta = (true_anomaly - self.true_anomaly_at_ut(now)).rem_euclid(TAU);
        now + delta / self.mean_motion()
    }

    fn radius_at_true_anomaly(&self, _true_anomaly: f64) -> f64 {
        self.radius()
    }

    fn time_to_apoapsis(&self) -> f64 {
        self.ut_at_true_anomaly(std::f64::consts::PI) - self.sim.ut.get()
    }

    fn time_to_periapsis(&self) -> f64 {
        self.ut_at_true_anomaly(0.0) - self.sim.ut.get()
    }
}
