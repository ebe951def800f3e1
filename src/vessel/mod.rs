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

//! Everything the mission needs from the vessel and its environment.
//!
//! All of the methods take `&self`: the mission runs on a single thread, and implementors which need to
//! mutate their state (e.g. a simulator advancing time) use interior mutability.

use crate::linalg::Vector3;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

mod node;
pub use node::{BurnDirection, ManeuverNode, Propulsion};

/// Relative telemetry of the chaser with respect to the target, in the local orbital frame.
pub trait TelemetrySource {
    /// Universal time in seconds
    fn ut(&self) -> f64;
    /// Relative position (m): anti-radial, along-track, cross-track
    fn relative_position(&self) -> Vector3<f64>;
    /// Relative velocity (m/s)
    fn relative_velocity(&self) -> Vector3<f64>;
}

/// Mission time keeping. Every wait goes through this trait, so a simulator may advance a virtual clock
/// instead of sleeping.
pub trait MissionClock {
    /// Blocks for `seconds` of mission time.
    fn wait(&self, seconds: f64);
    /// Sets the on-rails time acceleration factor, 0 meaning real time.
    fn set_warp(&self, factor: u32);
    /// Blocks until the provided universal time.
    fn warp_to(&self, ut: f64);
}

/// Osculating orbit of one of the vessels. Distances in meters, angles in radians, times in seconds.
pub trait OrbitQuery {
    fn periapsis(&self) -> f64;
    fn apoapsis(&self) -> f64;
    fn semi_major_axis(&self) -> f64;
    fn eccentricity(&self) -> f64;
    fn argument_of_periapsis(&self) -> f64;
    fn longitude_of_ascending_node(&self) -> f64;
    fn period(&self) -> f64;
    /// Current distance to the center of the body
    fn radius(&self) -> f64;
    fn true_anomaly_at_ut(&self, ut: f64) -> f64;
    /// Next universal time at which the true anomaly is reached
    fn ut_at_true_anomaly(&self, true_anomaly: f64) -> f64;
    fn radius_at_true_anomaly(&self, true_anomaly: f64) -> f64;
    fn time_to_apoapsis(&self) -> f64;
    fn time_to_periapsis(&self) -> f64;
}

/// Plans and executes impulsive maneuvers, blocking until the burn is complete.
pub trait ManeuverExecutor {
    fn execute_node(&self, node: &ManeuverNode) -> Result<(), VesselError>;
}

/// Continuous actuation, i.e. the RCS translation commands.
pub trait ActuationSink {
    /// Applies the acceleration command expressed in the body frame (m/s^2).
    fn apply(&self, body_command: Vector3<f64>) -> Result<(), VesselError>;

    /// Engages the attitude hold and the speed display reference before a phase.
    fn engage(&self, attitude: AttitudeMode, speed: SpeedMode) -> Result<(), VesselError> {
        debug!("attitude {attitude:?}, speed mode {speed:?}");
        Ok(())
    }
}

/// Rotates vectors between the reference frames of the chaser.
pub trait FrameTransform {
    fn transform(&self, vector: Vector3<f64>, from: Frame, to: Frame) -> Vector3<f64>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// Local orbital frame: anti-radial, along-track, cross-track
    Orbital,
    /// Chaser body frame
    Body,
}

/// Attitude hold modes used during the mission.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttitudeMode {
    StabilityAssist,
    Maneuver,
    Prograde,
    Retrograde,
    Normal,
    AntiNormal,
    Radial,
    AntiRadial,
    Target,
    AntiTarget,
}

/// Reference of the velocity displayed to, and held by, the attitude controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMode {
    Orbit,
    Surface,
    Target,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Orbital => write!(f, "orbital frame"),
            Frame::Body => write!(f, "body frame"),
        }
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VesselError {
    #[snafu(display("invalid burn direction `{given}`, expected prograde, normal or radial"))]
    InvalidDirection { given: String },
    #[snafu(display("maneuver node at UT {node_ut} s is in the past (now {now} s)"))]
    NodeInPast { node_ut: f64, now: f64 },
    #[snafu(display("maneuver of {delta_v_m_s} m/s {direction} failed: {reason}"))]
    ManeuverFailed {
        delta_v_m_s: f64,
        direction: BurnDirection,
        reason: String,
    },
    #[snafu(display("actuation rejected: {reason}"))]
    ActuationFailed { reason: String },
}
