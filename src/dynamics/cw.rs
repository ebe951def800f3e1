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

use super::{DynamicsError, InvalidOrbitalRateSnafu, LinearDynamics};
use crate::linalg::{Matrix2, Matrix2x1, Matrix4, Matrix4x2};
use snafu::ensure;
use std::fmt;

fn check_rate(rate: f64) -> Result<f64, DynamicsError> {
    ensure!(
        rate.is_finite() && rate > 0.0,
        InvalidOrbitalRateSnafu { rate }
    );
    Ok(rate)
}

/// In-plane Clohessy-Wiltshire dynamics.
///
/// State is (x, y, x_dot, y_dot) with x anti-radial and y along-track, the control is the acceleration along
/// both axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InPlaneDynamics {
    n: f64,
}

impl InPlaneDynamics {
    /// Initializes the dynamics from the mean motion `n` (rad/s) of the target.
    pub fn new(orbital_rate: f64) -> Result<Self, DynamicsError> {
        Ok(Self {
            n: check_rate(orbital_rate)?,
        })
    }
}

impl LinearDynamics<4, 2> for InPlaneDynamics {
    fn free_dynamics(&self) -> Matrix4<f64> {
        let n = self.n;
        Matrix4::new(
            0.0,
            0.0,
            1.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            3.0 * n.powi(2),
            0.0,
            0.0,
            -2.0 * n,
            0.0,
            0.0,
            2.0 * n,
            0.0,
        )
    }

    fn control_input(&self) -> Matrix4x2<f64> {
        Matrix4x2::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0)
    }

    fn orbital_rate(&self) -> f64 {
        self.n
    }
}

impl fmt::Display for InPlaneDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "in-plane CW dynamics (n = {:e} rad/s)", self.n)
    }
}

/// Out-of-plane Clohessy-Wiltshire dynamics: an undamped oscillator at the orbital rate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OutOfPlaneDynamics {
    n: f64,
}

impl OutOfPlaneDynamics {
    pub fn new(orbital_rate: f64) -> Result<Self, DynamicsError> {
        Ok(Self {
            n: check_rate(orbital_rate)?,
        })
    }
}

impl LinearDynamics<2, 1> for OutOfPlaneDynamics {
    fn free_dynamics(&self) -> Matrix2<f64> {
        Matrix2::new(0.0, 1.0, -self.n.powi(2), 0.0)
    }

    fn control_input(&self) -> Matrix2x1<f64> {
        Matrix2x1::new(0.0, 1.0)
    }

    fn orbital_rate(&self) -> f64 {
        self.n
    }
}

impl fmt::Display for OutOfPlaneDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "out-of-plane CW dynamics (n = {:e} rad/s)", self.n)
    }
}
