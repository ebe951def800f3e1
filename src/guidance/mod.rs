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

use crate::state::RelativeState;
use snafu::prelude::*;
use std::fmt;

mod cw;
pub use cw::ClosedFormGuidance;
mod smooth;
pub use smooth::{ProfileShape, SmoothGuidance, SmoothProfile};

/// A reference trajectory generator.
///
/// The meaning of `tau` depends on the implementor: elapsed seconds for the closed form Clohessy-Wiltshire
/// solution, normalized time in [0, 1] for the smooth profiles.
pub trait Guidance {
    fn reference(&self, tau: f64) -> Result<RelativeState, GuidanceError>;
}

/// Axes of the local orbital frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Anti-radial, R-bar
    Radial,
    /// V-bar
    AlongTrack,
    /// H-bar
    CrossTrack,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Radial, Axis::AlongTrack, Axis::CrossTrack];

    pub const fn index(self) -> usize {
        match self {
            Axis::Radial => 0,
            Axis::AlongTrack => 1,
            Axis::CrossTrack => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Axis::Radial => write!(f, "radial"),
            Axis::AlongTrack => write!(f, "along-track"),
            Axis::CrossTrack => write!(f, "cross-track"),
        }
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GuidanceError {
    #[snafu(display("guidance duration must be finite and positive, got {duration} s"))]
    InvalidDuration { duration: f64 },
    #[snafu(display("guidance evaluated at invalid time {tau}"))]
    InvalidTime { tau: f64 },
    #[snafu(display("reference trajectory needs a positive orbital rate, got {rate} rad/s"))]
    InvalidGuidanceRate { rate: f64 },
    #[snafu(display("{axis} profile evaluated before being configured"))]
    ProfileNotConfigured { axis: Axis },
}
