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
    begin, conclude, MissionContext, MissionPhase, PhaseError, PhaseGuidanceSnafu, PhaseKind,
    PhaseStatus, PhaseVesselSnafu,
};
use crate::guidance::{Guidance, SmoothGuidance};
use crate::io::{duration_from_str, duration_to_str, CycleRecord};
use crate::linalg::Vector3;
use crate::nav::Navigation;
use crate::time::{Duration, Unit};
use crate::vessel::{AttitudeMode, SpeedMode};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::fmt;

/// One closed loop approach to a point of the local orbital frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloseRangeSegment {
    /// Final relative position (m): anti-radial, along-track, cross-track
    pub target_position_m: [f64; 3],
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    pub duration: Duration,
    /// Largest position error, on each axis, at which the chaser is considered arrived
    pub tolerance_m: f64,
}

impl CloseRangeSegment {
    pub fn new(target_position_m: [f64; 3], duration: Duration, tolerance_m: f64) -> Self {
        Self {
            target_position_m,
            duration,
            tolerance_m,
        }
    }

    pub fn target_position(&self) -> Vector3<f64> {
        Vector3::from(self.target_position_m)
    }

    /// Arrival requires the profile to be over, even if the chaser is already close enough.
    pub fn inside_tolerance(&self, tau: f64, position: &Vector3<f64>) -> bool {
        tau >= 1.0
            && (position - self.target_position())
                .iter()
                .all(|err| err.abs() < self.tolerance_m)
    }
}

impl fmt::Display for CloseRangeSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [x, y, z] = self.target_position_m;
        write!(
            f,
            "[{x}, {y}, {z}] m in {} (tolerance {} m)",
            self.duration, self.tolerance_m
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloseRangeSettings {
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    pub control_period: Duration,
    pub segments: Vec<CloseRangeSegment>,
}

impl Default for CloseRangeSettings {
    /// Approach along V-bar to 100 m, then a cross-track offset of 30 m
    fn default() -> Self {
        Self {
            control_period: Unit::Millisecond * 100,
            segments: vec![
                CloseRangeSegment::new([0.0, 500.0, 0.0], Unit::Second * 90, 3.0),
                CloseRangeSegment::new([0.0, 100.0, 0.0], Unit::Second * 60, 3.0),
                CloseRangeSegment::new([0.0, 0.0, 30.0], Unit::Second * 45, 3.0),
            ],
        }
    }
}

/// Closed loop proximity operations: each segment flies smooth profiles from the current position to its
/// target, then keeps station until twice its duration has elapsed.
#[derive(Clone, Debug, PartialEq)]
pub struct CloseRangeManeuver {
    settings: CloseRangeSettings,
    guidance: SmoothGuidance,
    status: PhaseStatus,
    completed_segments: usize,
}

impl CloseRangeManeuver {
    pub fn new(settings: CloseRangeSettings) -> Self {
        Self {
            settings,
            guidance: SmoothGuidance::default(),
            status: PhaseStatus::NotStarted,
            completed_segments: 0,
        }
    }

    pub fn settings(&self) -> &CloseRangeSettings {
        &self.settings
    }

    pub fn completed_segments(&self) -> usize {
        self.completed_segments
    }

    /// Flies a single segment, returning the final position error.
    pub fn execute_segment(
        &mut self,
        ctx: &MissionContext,
        segment: &CloseRangeSegment,
    ) -> Result<Vector3<f64>, PhaseError> {
        let nav = ctx.navigation();
        let duration = segment.duration.to_seconds();
        let control_period = self.settings.control_period.to_seconds();
        let target = segment.target_position();

        let t0 = ctx.telemetry.ut();
        self.guidance
            .configure(ctx.telemetry.relative_position(), target, duration)
            .context(PhaseGuidanceSnafu {
                action: "configuring the approach profiles",
            })?;
        info!(
            "Starting maneuver from state {} towards {segment}",
            nav.output()
        );

        let mut suppressed = false;
        let mut ut = t0;
        while ut < t0 + 2.0 * duration {
            ut = ctx.telemetry.ut();
            let state = nav.output();
            let tau = (ut - t0) / duration;
            let reference = self
                .guidance
                .reference(tau.min(1.0))
                .context(PhaseGuidanceSnafu {
                    action: "evaluating the approach profiles",
                })?;

            let record = if segment.inside_tolerance(tau, &state.position()) {
                if !suppressed {
                    info!("Inside tolerance, not controlling");
                    ctx.actuate(Vector3::zeros())?;
                    suppressed = true;
                }
                CycleRecord::new(
                    ut,
                    PhaseKind::CloseRangeManeuver,
                    tau,
                    &state,
                    &reference,
                    Vector3::zeros(),
                    Vector3::zeros(),
                    false,
                )
            } else {
                suppressed = false;
                let command = ctx.gnc.command(&state, &reference);
                let body_command = ctx.actuate(command)?;
                CycleRecord::new(
                    ut,
                    PhaseKind::CloseRangeManeuver,
                    tau,
                    &state,
                    &reference,
                    command,
                    body_command,
                    true,
                )
            };
            ctx.recorder.record(record);
            ctx.clock.wait(control_period);
        }

        ctx.actuate(Vector3::zeros())?;
        let error = nav.output().position() - target;
        info!(
            "End of segment, position error [{:.2}, {:.2}, {:.2}] m",
            error.x, error.y, error.z
        );
        Ok(error)
    }

    fn approach(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        ctx.actuators
            .engage(AttitudeMode::Target, SpeedMode::Target)
            .context(PhaseVesselSnafu {
                action: "engaging the target attitude",
            })?;

        let segments = self.settings.segments.clone();
        for (i, segment) in segments.iter().enumerate() {
            info!("Close range segment {}/{}", i + 1, segments.len());
            self.execute_segment(ctx, segment)?;
            self.completed_segments += 1;
        }
        Ok(())
    }
}

impl MissionPhase for CloseRangeManeuver {
    fn kind(&self) -> PhaseKind {
        PhaseKind::CloseRangeManeuver
    }

    fn status(&self) -> PhaseStatus {
        self.status
    }

    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        self.status = begin(self.kind(), self.status)?;
        let rslt = self.approach(ctx);
        self.status = conclude(self.kind(), &rslt);
        rslt
    }
}
