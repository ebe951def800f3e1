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
    begin, conclude, InvalidPhasingPeriodSnafu, MissionContext, MissionPhase, PhaseError,
    PhaseKind, PhaseStatus, PhaseVesselSnafu, PhasingBoundsUnreachableSnafu,
};
use crate::cosmic::{
    eccentric_anomaly_difference, format_duration, phase_offset, time_difference,
    MIN_SAFE_ALTITUDE_M,
};
use crate::vessel::{AttitudeMode, BurnDirection, ManeuverNode, Propulsion, SpeedMode};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::f64::consts::{PI, TAU};
use std::fmt;

/// How many phasing orbits are flown before recircularizing.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PhasingStrategy {
    /// Always the same number of orbits. The phasing orbit is only checked against the minimum safe altitude,
    /// and a violation is logged without changing the plan.
    Fixed { orbits: u32 },
    /// Smallest number of orbits for which the other apsis of the phasing orbit stays between the minimum
    /// safe altitude and `max_apoapsis_factor` times the apoapsis of the target.
    SafetyBounded {
        min_altitude_m: f64,
        max_apoapsis_factor: f64,
        max_orbits: u32,
    },
}

impl Default for PhasingStrategy {
    fn default() -> Self {
        Self::Fixed { orbits: 3 }
    }
}

/// Phasing orbit closing the phase angle between both vessels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhasingSolution {
    /// Phase angle (rad) at the chaser apoapsis, positive when the chaser is behind
    pub phase_offset_rad: f64,
    /// Time the target needs to cover the phase angle
    pub time_difference_s: f64,
    pub period_s: f64,
    pub sma_m: f64,
    pub orbits: u32,
}

impl PhasingSolution {
    pub fn behind(&self) -> bool {
        self.phase_offset_rad >= 0.0
    }
}

impl fmt::Display for PhasingSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "chaser {} of target by {:.2} deg ({}), {} phasing orbit(s) of {} (sma = {:.1} m)",
            if self.behind() { "behind" } else { "ahead" },
            self.phase_offset_rad.to_degrees(),
            format_duration(self.time_difference_s),
            self.orbits,
            format_duration(self.period_s),
            self.sma_m
        )
    }
}

/// Phasing: a phasing orbit through the current apoapsis of the chaser is flown for a few revolutions so that
/// the target leads by the desired final phase when the chaser recircularizes.
#[derive(Clone, Debug, PartialEq)]
pub struct Phasing {
    desired_apoapsis_m: f64,
    final_phase_rad: f64,
    strategy: PhasingStrategy,
    status: PhaseStatus,
    solution: Option<PhasingSolution>,
}

impl Phasing {
    pub fn new(desired_apoapsis_m: f64, final_phase_deg: f64, strategy: PhasingStrategy) -> Self {
        Self {
            desired_apoapsis_m,
            final_phase_rad: final_phase_deg.to_radians(),
            strategy,
            status: PhaseStatus::NotStarted,
            solution: None,
        }
    }

    pub fn strategy(&self) -> PhasingStrategy {
        self.strategy
    }

    /// Solution flown during the last execution.
    pub fn solution(&self) -> Option<PhasingSolution> {
        self.solution
    }

    /// Phase angle, in [-pi, pi), between the target and the chaser at the next chaser apoapsis, reduced by
    /// the desired final phase.
    pub fn phase_difference(&self, ctx: &MissionContext) -> f64 {
        let chaser_apo_ut = ctx.telemetry.ut() + ctx.chaser.time_to_apoapsis();
        let target_ta = (ctx.target.true_anomaly_at_ut(chaser_apo_ut) - self.final_phase_rad)
            .rem_euclid(TAU);
        let phi = phase_offset(
            target_ta,
            ctx.target.argument_of_periapsis(),
            ctx.chaser.argument_of_periapsis(),
        );
        (phi + PI).rem_euclid(TAU) - PI
    }

    pub fn solve(&self, ctx: &MissionContext) -> Result<PhasingSolution, PhaseError> {
        let phase_offset_rad = self.phase_difference(ctx);
        let target_ecc = ctx.target.eccentricity();
        let target_period = ctx.target.period();
        let delta_ea = eccentric_anomaly_difference(target_ecc, phase_offset_rad.abs());
        let time_difference_s = time_difference(delta_ea, target_ecc, target_period);

        // A lagging chaser catches up on a shorter orbit
        let period_for = |orbits: u32| {
            if phase_offset_rad >= 0.0 {
                target_period - time_difference_s / f64::from(orbits)
            } else {
                target_period + time_difference_s / f64::from(orbits)
            }
        };

        let apsis = ctx.chaser.apoapsis();
        let (orbits, period_s) = match self.strategy {
            PhasingStrategy::Fixed { orbits } => {
                let period = period_for(orbits);
                if !ctx
                    .body
                    .phasing_period_valid(period, apsis, MIN_SAFE_ALTITUDE_M)
                {
                    warn!(
                        "phasing orbit of {} dips below the minimum safe altitude of {} m",
                        format_duration(period),
                        MIN_SAFE_ALTITUDE_M
                    );
                }
                (orbits, period)
            }
            PhasingStrategy::SafetyBounded {
                min_altitude_m,
                max_apoapsis_factor,
                max_orbits,
            } => {
                let lower = ctx.body.min_safe_radius(min_altitude_m);
                let upper = ctx.target.apoapsis() * max_apoapsis_factor;
                let mut other_apsis = f64::NAN;
                let mut found = None;
                for orbits in 1..=max_orbits {
                    let period = period_for(orbits);
                    other_apsis = ctx.body.apsis_from_period_and_apsis(period, apsis);
                    if (lower..=upper).contains(&other_apsis) {
                        found = Some((orbits, period));
                        break;
                    }
                    debug!("{orbits} phasing orbit(s) lead to an apsis of {other_apsis:.1} m");
                }
                found.context(PhasingBoundsUnreachableSnafu {
                    max_orbits,
                    apsis_m: other_apsis,
                })?
            }
        };

        ensure!(
            period_s.is_finite() && period_s > 0.0,
            InvalidPhasingPeriodSnafu { period_s }
        );

        Ok(PhasingSolution {
            phase_offset_rad,
            time_difference_s,
            period_s,
            sma_m: ctx.body.sma_from_period(period_s),
            orbits,
        })
    }

    fn fly(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        ctx.actuators
            .engage(AttitudeMode::Maneuver, SpeedMode::Orbit)
            .context(PhaseVesselSnafu {
                action: "engaging the maneuver attitude",
            })?;

        let solution = self.solve(ctx)?;
        info!("Summary of calculations for phasing: {solution}");
        info!(
            "Target orbit period: {}",
            format_duration(ctx.target.period())
        );
        self.solution = Some(solution);

        let radius = self.desired_apoapsis_m;
        let insertion = ManeuverNode::new(
            ctx.telemetry.ut() + ctx.chaser.time_to_apoapsis(),
            ctx.body
                .delta_v(radius, ctx.chaser.semi_major_axis(), solution.sma_m),
            BurnDirection::Prograde,
            Propulsion::MainEngine,
        );
        info!("Phasing orbit insertion: {insertion}");
        ctx.maneuvers
            .execute_node(&insertion)
            .context(PhaseVesselSnafu {
                action: "inserting into the phasing orbit",
            })?;

        // Back at the insertion point after the phasing orbits
        let recirc_ut = insertion.ut + f64::from(solution.orbits) * ctx.chaser.period();
        let recirc_sma =
            ctx.target.semi_major_axis() - (ctx.target.apoapsis() - self.desired_apoapsis_m);
        let recirc = ManeuverNode::new(
            recirc_ut,
            ctx.body
                .delta_v(radius, ctx.chaser.semi_major_axis(), recirc_sma),
            BurnDirection::Prograde,
            Propulsion::MainEngine,
        );
        info!("Recircularization: {recirc}");
        ctx.maneuvers
            .execute_node(&recirc)
            .context(PhaseVesselSnafu {
                action: "recircularizing",
            })?;

        info!(
            "Chaser orbit: periapsis {:.1} m, apoapsis {:.1} m",
            ctx.chaser.periapsis(),
            ctx.chaser.apoapsis()
        );
        Ok(())
    }
}

impl MissionPhase for Phasing {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Phasing
    }

    fn status(&self) -> PhaseStatus {
        self.status
    }

    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        self.status = begin(self.kind(), self.status)?;
        let rslt = self.fly(ctx);
        self.status = conclude(self.kind(), &rslt);
        rslt
    }
}
