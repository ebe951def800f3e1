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

use crate::control::{Controller, CostWeights, Lqr};
use crate::cosmic::CelestialBody;
use crate::dynamics::{InPlaneDynamics, OutOfPlaneDynamics};
use crate::errors::RendezvousError;
use crate::guidance::GuidanceError;
use crate::io::{FlightRecorder, MissionConfig};
use crate::linalg::Vector3;
use crate::nav::FullKnowledgeNavigation;
use crate::state::RelativeState;
use crate::vessel::{
    ActuationSink, Frame, FrameTransform, ManeuverExecutor, MissionClock, OrbitQuery,
    TelemetrySource, VesselError,
};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

mod close_range;
mod homing;
mod orbit_raise;
mod phasing;

pub use close_range::{CloseRangeManeuver, CloseRangeSegment, CloseRangeSettings};
pub use homing::{cw_hohmann_transfer, Homing, HomingSettings, HohmannTransfer};
pub use orbit_raise::OrbitRaise;
pub use phasing::{Phasing, PhasingSolution, PhasingStrategy};

/// The four rendezvous phases, in the only order in which they may run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    OrbitRaise,
    Phasing,
    Homing,
    CloseRangeManeuver,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::OrbitRaise => write!(f, "Orbit raise"),
            Self::Phasing => write!(f, "Phasing"),
            Self::Homing => write!(f, "Homing"),
            Self::CloseRangeManeuver => write!(f, "Close range maneuver"),
        }
    }
}

/// Lifecycle of a phase: NotStarted -> Running -> Completed | Failed, with no way back.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// A mission phase owns its control law and its termination condition.
pub trait MissionPhase {
    fn kind(&self) -> PhaseKind;

    fn status(&self) -> PhaseStatus;

    /// Runs the phase to completion, blocking on the collaborators of the context.
    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError>;
}

/// Moves a phase into the Running state, a phase may only be executed once.
pub(crate) fn begin(kind: PhaseKind, status: PhaseStatus) -> Result<PhaseStatus, PhaseError> {
    ensure!(
        status == PhaseStatus::NotStarted,
        AlreadyExecutedSnafu { kind, status }
    );
    info!("===== {kind} phase =====");
    Ok(PhaseStatus::Running)
}

pub(crate) fn conclude(kind: PhaseKind, rslt: &Result<(), PhaseError>) -> PhaseStatus {
    match rslt {
        Ok(()) => {
            info!("===== {kind} phase finished =====");
            PhaseStatus::Completed
        }
        Err(e) => {
            error!("{kind} phase failed: {e}");
            PhaseStatus::Failed
        }
    }
}

/// Dynamics and controllers of both partitions, synthesized once for the target orbital rate and shared by
/// every closed loop phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gnc {
    pub orbital_rate: f64,
    pub in_plane_dynamics: InPlaneDynamics,
    pub out_of_plane_dynamics: OutOfPlaneDynamics,
    pub in_plane: Lqr<4, 2>,
    pub out_of_plane: Lqr<2, 1>,
}

impl Gnc {
    pub fn synthesize(orbital_rate: f64, costs: CostWeights) -> Result<Self, RendezvousError> {
        info!("Target orbital rate: {orbital_rate:e} rad/s");
        let in_plane_dynamics = InPlaneDynamics::new(orbital_rate)?;
        let out_of_plane_dynamics = OutOfPlaneDynamics::new(orbital_rate)?;

        let in_plane = Lqr::synthesize(&in_plane_dynamics, costs)?;
        let out_of_plane = Lqr::synthesize(&out_of_plane_dynamics, costs)?;

        info!("===== Optimal control parameters for closed loop maneuvers =====");
        info!("{costs}");
        info!("in plane gain: {}", in_plane.gain());
        info!("out of plane gain: {}", out_of_plane.gain());

        Ok(Self {
            orbital_rate,
            in_plane_dynamics,
            out_of_plane_dynamics,
            in_plane,
            out_of_plane,
        })
    }

    /// Feedback command of both partitions, stacked as an orbital frame acceleration (m/s^2).
    pub fn command(&self, nav: &RelativeState, reference: &RelativeState) -> Vector3<f64> {
        let u_in = self.in_plane.control(&nav.in_plane, &reference.in_plane);
        let u_out = self
            .out_of_plane
            .control(&nav.out_of_plane, &reference.out_of_plane);
        Vector3::new(u_in[0], u_in[1], u_out[0])
    }
}

/// Everything a phase may use while executing.
#[derive(Copy, Clone)]
pub struct MissionContext<'a> {
    pub body: &'a CelestialBody,
    pub gnc: &'a Gnc,
    pub telemetry: &'a dyn TelemetrySource,
    pub clock: &'a dyn MissionClock,
    pub chaser: &'a dyn OrbitQuery,
    pub target: &'a dyn OrbitQuery,
    pub maneuvers: &'a dyn ManeuverExecutor,
    pub actuators: &'a dyn ActuationSink,
    pub frames: &'a dyn FrameTransform,
    pub recorder: &'a dyn FlightRecorder,
}

impl<'a> MissionContext<'a> {
    /// Builds a context where a single environment provides telemetry, time, maneuvers, actuation and frames.
    pub fn new<W>(
        world: &'a W,
        chaser: &'a dyn OrbitQuery,
        target: &'a dyn OrbitQuery,
        body: &'a CelestialBody,
        gnc: &'a Gnc,
        recorder: &'a dyn FlightRecorder,
    ) -> Self
    where
        W: TelemetrySource + MissionClock + ManeuverExecutor + ActuationSink + FrameTransform,
    {
        Self {
            body,
            gnc,
            telemetry: world,
            clock: world,
            chaser,
            target,
            maneuvers: world,
            actuators: world,
            frames: world,
            recorder,
        }
    }

    pub fn navigation(&self) -> FullKnowledgeNavigation<'a> {
        FullKnowledgeNavigation::new(self.telemetry)
    }

    /// Rotates the orbital frame command into the body frame and dispatches it, returning the body command.
    pub(crate) fn actuate(&self, command: Vector3<f64>) -> Result<Vector3<f64>, PhaseError> {
        let body_command = self.frames.transform(command, Frame::Orbital, Frame::Body);
        self.actuators.apply(body_command).context(PhaseVesselSnafu {
            action: "applying the RCS command",
        })?;
        Ok(body_command)
    }
}

/// Closed set of phases a mission is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum RendezvousPhase {
    OrbitRaise(OrbitRaise),
    Phasing(Phasing),
    Homing(Homing),
    CloseRange(CloseRangeManeuver),
}

impl MissionPhase for RendezvousPhase {
    fn kind(&self) -> PhaseKind {
        match self {
            Self::OrbitRaise(p) => p.kind(),
            Self::Phasing(p) => p.kind(),
            Self::Homing(p) => p.kind(),
            Self::CloseRange(p) => p.kind(),
        }
    }

    fn status(&self) -> PhaseStatus {
        match self {
            Self::OrbitRaise(p) => p.status(),
            Self::Phasing(p) => p.status(),
            Self::Homing(p) => p.status(),
            Self::CloseRange(p) => p.status(),
        }
    }

    fn execute_phase(&mut self, ctx: &MissionContext) -> Result<(), PhaseError> {
        match self {
            Self::OrbitRaise(p) => p.execute_phase(ctx),
            Self::Phasing(p) => p.execute_phase(ctx),
            Self::Homing(p) => p.execute_phase(ctx),
            Self::CloseRange(p) => p.execute_phase(ctx),
        }
    }
}

impl From<OrbitRaise> for RendezvousPhase {
    fn from(phase: OrbitRaise) -> Self {
        Self::OrbitRaise(phase)
    }
}

impl From<Phasing> for RendezvousPhase {
    fn from(phase: Phasing) -> Self {
        Self::Phasing(phase)
    }
}

impl From<Homing> for RendezvousPhase {
    fn from(phase: Homing) -> Self {
        Self::Homing(phase)
    }
}

impl From<CloseRangeManeuver> for RendezvousPhase {
    fn from(phase: CloseRangeManeuver) -> Self {
        Self::CloseRange(phase)
    }
}

/// Sequencer of the rendezvous phases.
///
/// Phases run strictly in order. The first failure aborts the mission: the failed phase is left `Failed`, the
/// following ones `NotStarted`, and a new mission must be built to try again.
#[derive(Clone, Debug, PartialEq)]
pub struct Mission {
    phases: Vec<RendezvousPhase>,
}

impl Mission {
    /// Full rendezvous mission. The chaser is raised to `r_bar_safety_distance_m` below the periapsis of
    /// the target.
    pub fn new(cfg: &MissionConfig, target_periapsis_m: f64) -> Result<Self, MissionError> {
        let desired_apoapsis = target_periapsis_m - cfg.r_bar_safety_distance_m;
        info!("===== Input parameters =====");
        info!(
            "R bar safety distance at the end of orbital phasing: {} m",
            cfg.r_bar_safety_distance_m
        );
        info!("Chaser orbit desired apoapsis: {desired_apoapsis} m");

        Self::from_phases(vec![
            OrbitRaise::new(desired_apoapsis).into(),
            Phasing::new(desired_apoapsis, cfg.final_phase_offset_deg, cfg.phasing).into(),
            Homing::new(cfg.homing.clone()).into(),
            CloseRangeManeuver::new(cfg.close_range.clone()).into(),
        ])
    }

    /// Builds a mission from a subset of the phases, which must be provided in order and at most once each.
    pub fn from_phases(phases: Vec<RendezvousPhase>) -> Result<Self, MissionError> {
        ensure!(!phases.is_empty(), EmptyMissionSnafu);
        for pair in phases.windows(2) {
            let (previous, kind) = (pair[0].kind(), pair[1].kind());
            ensure!(previous < kind, PhaseOrderSnafu { previous, kind });
        }
        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[RendezvousPhase] {
        &self.phases
    }

    pub fn statuses(&self) -> Vec<(PhaseKind, PhaseStatus)> {
        self.phases.iter().map(|p| (p.kind(), p.status())).collect()
    }

    /// Executes every phase in order, stopping at the first failure.
    pub fn run(&mut self, ctx: &MissionContext) -> Result<(), MissionError> {
        info!("===== Mission execution =====");
        for phase in self.phases.iter_mut() {
            let kind = phase.kind();
            phase
                .execute_phase(ctx)
                .context(PhaseFailedSnafu { kind })?;
        }
        info!("===== Mission complete =====");
        Ok(())
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PhaseError {
    #[snafu(display("chaser orbit is above target orbit (altitude difference {delta_h} m)"))]
    ChaserAboveTarget { delta_h: f64 },
    #[snafu(display("{kind} phase cannot be executed from status {status:?}"))]
    AlreadyExecuted { kind: PhaseKind, status: PhaseStatus },
    #[snafu(display("vessel error when {action}: {source}"))]
    PhaseVessel {
        action: &'static str,
        source: VesselError,
    },
    #[snafu(display("guidance error when {action}: {source}"))]
    PhaseGuidance {
        action: &'static str,
        source: GuidanceError,
    },
    #[snafu(display(
        "no phasing orbit within safety bounds after {max_orbits} orbits (last apsis {apsis_m} m)"
    ))]
    PhasingBoundsUnreachable { max_orbits: u32, apsis_m: f64 },
    #[snafu(display("invalid phasing orbit period {period_s} s"))]
    InvalidPhasingPeriod { period_s: f64 },
    #[snafu(display("recircularization burn never executed (coast fraction {coast_fraction})"))]
    RecircularizationSkipped { coast_fraction: f64 },
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum MissionError {
    #[snafu(display("{kind} phase failed: {source}"))]
    PhaseFailed { kind: PhaseKind, source: PhaseError },
    #[snafu(display("{kind} phase cannot follow {previous} phase"))]
    PhaseOrder {
        previous: PhaseKind,
        kind: PhaseKind,
    },
    #[snafu(display("a mission needs at least one phase"))]
    EmptyMission,
}
