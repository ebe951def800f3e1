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

use super::{
    begin, conclude, MissionContext, MissionPhase, PhaseError, PhaseKind, PhaseStatus,
    PhaseVesselSnafu,
};
use crate::vessel::{AttitudeMode, BurnDirection, ManeuverNode, Propulsion, SpeedMode};
use snafu::ResultExt;
use std::f64::consts::TAU;

/// Raises the apoapsis of the chaser to just below the target orbit, with a single prograde burn where the
/// periapsis of the target lies in the orbit of the chaser.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitRaise {
    desired_apoapsis_m: f64,
    status: PhaseStatus,
    executed: Option<ManeuverNode>,
}

impl OrbitRaise {
    pub fn new(desired_apoapsis_m: f64) -> Self {
        Self {
            desired_apoapsis_m,
            status: PhaseStatus::NotStarted,
            executed: None,
        }
    }

    pub fn desired_apoapsis(&self) -> f64 {
        self.desired_apoapsis_m
    }

    /// The raise maneuver, once executed.
    pub fn maneuver(&self) -> Option<ManeuverNode> {
        self.executed
    }

    /// Plans the raise burn from the current orbits of both vessels.
    pub fn plan(&self, ctx: &MissionContext) -> ManeuverNode {
        let (chaser, target) = (ctx.chaser, ctx.target);
        // Periapsis of the target, as a true anomaly of the chaser orbit
        let true_anomaly = (target.argument_of_periapsis() + target.longitude_of_ascending_node()
            - chaser.argument_of_periapsis()
            - chaser.longitude_of_ascending_node())
        .rem_euclid(TAU);

        let burn_radius = chaser.radius_at_true_anomaly(true_anomaly);
        let burn_ut = chaser.ut_at_true_anomaly(true_anomaly);
        let new_sma = ctx
            .body
            .sma_from_apsides(burn_radius, self.desired_apoapsis_m);
        let delta_v = ctx
            .body
            .delta_v(burn_radius, chaser.semi_major_axis(), new_sma);

        ManeuverNode::new(burn_ut, delta_v, BurnDirection::Prograde, Propulsion::MainEngine)
    }

    fn raise(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        ctx.actuators
            .engage(AttitudeMode::Maneuver, SpeedMode::Orbit)
            .context(PhaseVesselSnafu {
                action: "engaging the maneuver attitude",
            })?;

        let node = self.plan(ctx);
        info!("Raising the apoapsis to {} m: {node}", self.desired_apoapsis_m);
        ctx.maneuvers
            .execute_node(&node)
            .context(PhaseVesselSnafu {
                action: "executing the orbit raise",
            })?;
        self.executed = Some(node);

        info!(
            "Chaser orbit: periapsis {:.1} m, apoapsis {:.1} m",
            ctx.chaser.periapsis(),
            ctx.chaser.apoapsis()
        );
        Ok(())
    }
}

impl MissionPhase for OrbitRaise {
    fn kind(&self) -> PhaseKind {
        PhaseKind::OrbitRaise
    }

    fn status(&self) -> PhaseStatus {
        self.status
    }

    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        self.status = begin(self.kind(), self.status)?;
        let rslt = self.raise(ctx);
        self.status = conclude(self.kind(), &rslt);
        rslt
    }
}
