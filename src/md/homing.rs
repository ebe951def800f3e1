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
    begin, conclude, ChaserAboveTargetSnafu, MissionContext, MissionPhase, PhaseError,
    PhaseGuidanceSnafu, PhaseKind, PhaseStatus, PhaseVesselSnafu, RecircularizationSkippedSnafu,
};
use crate::guidance::{ClosedFormGuidance, Guidance};
use crate::io::{duration_from_str, duration_to_str, CycleRecord};
use crate::linalg::Vector3;
use crate::nav::Navigation;
use crate::state::RelativeState;
use crate::time::{Duration, Unit};
use crate::vessel::{AttitudeMode, BurnDirection, ManeuverNode, Propulsion, SpeedMode};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::f64::consts::{PI, TAU};
use std::fmt;
use typed_builder::TypedBuilder;

/// Tuning of the homing phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct HomingSettings {
    /// Along-track position of the chaser, behind the target, at the end of the transfer
    #[builder(default = 1000.0)]
    pub final_along_track_m: f64,
    /// Fraction of the target period coasted after the transfer burn, before closing the loop. Must be
    /// within [0, 0.5) for the recircularization burn to happen on time.
    #[builder(default = 0.25)]
    pub coast_fraction: f64,
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = Unit::Millisecond * 200)]
    pub control_period: Duration,
    /// Period at which the drift towards the insertion point is monitored
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = Unit::Second * 1)]
    pub poll_period: Duration,
    /// Wait around warp changes
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = Unit::Second * 5)]
    pub settle: Duration,
    /// Lead time of the maneuver nodes
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = Unit::Second * 5)]
    pub node_lead: Duration,
    #[builder(default = 2)]
    pub warp_factor: u32,
}

impl Default for HomingSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Two impulse transfer, in the relative frame, between two circular orbits separated by `delta_h_m`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HohmannTransfer {
    /// Radius of the target minus radius of the chaser
    pub delta_h_m: f64,
    /// Along-track distance covered during the transfer
    pub drift_m: f64,
    /// Magnitude of both prograde burns
    pub delta_v_m_s: f64,
    /// Along-track position at which the first burn must happen
    pub insertion_along_track_m: f64,
}

impl fmt::Display for HohmannTransfer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "dh = {:.2} m, insertion at y = {:.2} m, drift {:.2} m, two burns of {:.4} m/s",
            self.delta_h_m, self.insertion_along_track_m, self.drift_m, self.delta_v_m_s
        )
    }
}

/// Computes the relative Hohmann transfer reaching `final_along_track_m` on the target orbit.
///
/// Half a target period after a prograde burn of `w |dh| / 4`, the chaser has climbed by `|dh|` and drifted by
/// `3 pi |dh| / 4` along-track. Fails if the chaser is above the target.
pub fn cw_hohmann_transfer(
    target_period_s: f64,
    delta_h_m: f64,
    final_along_track_m: f64,
) -> Result<HohmannTransfer, PhaseError> {
    if delta_h_m < 0.0 {
        error!("Chaser orbit is above target orbit by {} m", -delta_h_m);
        return ChaserAboveTargetSnafu { delta_h: delta_h_m }.fail();
    }
    let w = TAU / target_period_s;
    let drift_m = delta_h_m.abs() * 3.0 * PI / 4.0;
    Ok(HohmannTransfer {
        delta_h_m,
        drift_m,
        delta_v_m_s: w / 4.0 * delta_h_m.abs(),
        insertion_along_track_m: final_along_track_m - drift_m,
    })
}

/// Homing: drift on the lower orbit until the insertion point, then fly the relative Hohmann transfer to the
/// target orbit under closed loop control.
#[derive(Clone, Debug, PartialEq)]
pub struct Homing {
    settings: HomingSettings,
    status: PhaseStatus,
}

impl Homing {
    pub fn new(settings: HomingSettings) -> Self {
        Self {
            settings,
            status: PhaseStatus::NotStarted,
        }
    }

    pub fn settings(&self) -> &HomingSettings {
        &self.settings
    }

    /// Transfer from the current orbits of both vessels.
    pub fn transfer(&self, ctx: &MissionContext) -> Result<HohmannTransfer, PhaseError> {
        cw_hohmann_transfer(
            ctx.target.period(),
            ctx.target.radius() - ctx.chaser.radius(),
            self.settings.final_along_track_m,
        )
    }

    fn rcs_node(&self, ctx: &MissionContext, delta_v: f64) -> ManeuverNode {
        ManeuverNode::relative(
            ctx.telemetry.ut(),
            self.settings.node_lead.to_seconds(),
            delta_v,
            BurnDirection::Prograde,
            Propulsion::Rcs,
        )
    }

    /// Waits, at the configured time acceleration, until the chaser drifted to the insertion point.
    fn drift_to_insertion(&self, ctx: &MissionContext) -> Result<HohmannTransfer, PhaseError> {
        let mut transfer = self.transfer(ctx)?;
        info!("Relative Hohmann transfer: {transfer}");

        ctx.clock.wait(self.settings.settle.to_seconds());
        ctx.clock.set_warp(self.settings.warp_factor);
        while ctx.telemetry.relative_position().y < transfer.insertion_along_track_m {
            ctx.clock.wait(self.settings.poll_period.to_seconds());
            transfer = self.transfer(ctx)?;
        }
        ctx.clock.set_warp(0);
        ctx.clock.wait(self.settings.settle.to_seconds());

        // Orbits may have changed slightly while drifting
        self.transfer(ctx)
    }

    fn home(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        ctx.actuators
            .engage(AttitudeMode::Prograde, SpeedMode::Orbit)
            .context(PhaseVesselSnafu {
                action: "engaging the prograde attitude",
            })?;

        let transfer = self.drift_to_insertion(ctx)?;
        info!("Reached the insertion point: {transfer}");

        let period = ctx.target.period();
        let w = TAU / period;
        let dh = transfer.delta_h_m.abs();
        let guidance = ClosedFormGuidance::new(
            w,
            Vector3::new(dh, transfer.insertion_along_track_m, 0.0),
            Vector3::new(0.0, 7.0 * w / 4.0 * dh, 0.0),
        )
        .context(PhaseGuidanceSnafu {
            action: "initializing the transfer guidance",
        })?;

        let insertion = self.rcs_node(ctx, transfer.delta_v_m_s);
        info!("Transfer burn: {insertion}");
        ctx.maneuvers
            .execute_node(&insertion)
            .context(PhaseVesselSnafu {
                action: "executing the transfer burn",
            })?;
        let t0 = insertion.ut;

        ctx.clock.warp_to(t0 + self.settings.coast_fraction * period);

        // Hold point after the recircularization burn
        let half = period / 2.0;
        let arrival = guidance.state_at(half);
        let hold = RelativeState::from_cartesian(
            arrival.position(),
            arrival.velocity() + Vector3::new(0.0, transfer.delta_v_m_s, 0.0),
        );

        let nav = ctx.navigation();
        let control_period = self.settings.control_period.to_seconds();
        let mut recirc_done = false;
        loop {
            let ut = ctx.telemetry.ut();
            let tau = ut - t0;
            if tau >= period {
                break;
            }

            let reference = if tau + control_period < half {
                guidance.reference(tau).context(PhaseGuidanceSnafu {
                    action: "evaluating the transfer reference",
                })?
            } else {
                if !recirc_done {
                    let recirc = ManeuverNode::new(
                        (t0 + half).max(ut),
                        transfer.delta_v_m_s,
                        BurnDirection::Prograde,
                        Propulsion::Rcs,
                    );
                    info!("Recircularization burn: {recirc}");
                    ctx.maneuvers
                        .execute_node(&recirc)
                        .context(PhaseVesselSnafu {
                            action: "executing the recircularization burn",
                        })?;
                    recirc_done = true;
                    continue;
                }
                hold
            };

            let state = nav.output();
            let command = ctx.gnc.command(&state, &reference);
            let body_command = ctx.actuate(command)?;
            debug!(
                "tau = {tau:.1} s, u = [{:.3e}, {:.3e}, {:.3e}] m/s^2",
                command.x, command.y, command.z
            );
            ctx.recorder.record(CycleRecord::new(
                ut,
                PhaseKind::Homing,
                tau,
                &state,
                &reference,
                command,
                body_command,
                true,
            ));
            ctx.clock.wait(control_period);
        }

        ctx.actuate(Vector3::zeros())?;
        if !recirc_done {
            error!("Homing ended on the transfer orbit");
            return RecircularizationSkippedSnafu {
                coast_fraction: self.settings.coast_fraction,
            }
            .fail();
        }
        let final_state = nav.output();
        info!("Homing complete, relative state {final_state}");
        Ok(())
    }
}

impl MissionPhase for Homing {
    fn kind(&self) -> PhaseKind {
        PhaseKind::Homing
    }

    fn status(&self) -> PhaseStatus {
        self.status
    }

    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        self.status = begin(self.kind(), self.status)?;
        let rslt = self.home(ctx);
        self.status = conclude(self.kind(), &rslt);
        rslt
    }
}
