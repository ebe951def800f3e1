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

use super::{InvalidDirectionSnafu, VesselError};
use crate::linalg::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of an impulsive burn in the local orbital frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnDirection {
    Prograde,
    Normal,
    Radial,
}

impl BurnDirection {
    /// Unit vector of this direction in the local orbital frame (anti-radial, along-track, cross-track).
    pub fn orbital_unit(self) -> Vector3<f64> {
        match self {
            Self::Prograde => Vector3::new(0.0, 1.0, 0.0),
            // Radial out is opposite to the anti-radial axis
            Self::Radial => Vector3::new(-1.0, 0.0, 0.0),
            Self::Normal => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}

impl FromStr for BurnDirection {
    type Err = VesselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prograde" => Ok(Self::Prograde),
            "normal" => Ok(Self::Normal),
            "radial" => Ok(Self::Radial),
            _ => InvalidDirectionSnafu { given: s }.fail(),
        }
    }
}

impl fmt::Display for BurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Prograde => write!(f, "prograde"),
            Self::Normal => write!(f, "normal"),
            Self::Radial => write!(f, "radial"),
        }
    }
}

/// Thrusters executing a maneuver node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Propulsion {
    /// Main engine, pointed along the burn vector before the burn
    MainEngine,
    /// Translation with the reaction control system, attitude held prograde
    Rcs,
}

/// An impulsive maneuver: a delta-v magnitude along a direction at a given universal time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ManeuverNode {
    pub ut: f64,
    /// Signed magnitude, a negative prograde burn is retrograde
    pub delta_v_m_s: f64,
    pub direction: BurnDirection,
    pub propulsion: Propulsion,
}

impl ManeuverNode {
    pub fn new(
        ut: f64,
        delta_v_m_s: f64,
        direction: BurnDirection,
        propulsion: Propulsion,
    ) -> Self {
        Self {
            ut,
            delta_v_m_s,
            direction,
            propulsion,
        }
    }

    /// Node placed `in_seconds` after `now`.
    pub fn relative(
        now: f64,
        in_seconds: f64,
        delta_v_m_s: f64,
        direction: BurnDirection,
        propulsion: Propulsion,
    ) -> Self {
        Self::new(now + in_seconds, delta_v_m_s, direction, propulsion)
    }

    /// Delta-v vector in the local orbital frame.
    pub fn delta_v_vector(&self) -> Vector3<f64> {
        self.direction.orbital_unit() * self.delta_v_m_s
    }
}

impl fmt::Display for ManeuverNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.3} m/s {} ({:?}) at UT {:.1} s",
            self.delta_v_m_s, self.direction, self.propulsion, self.ut
        )
    }
}
