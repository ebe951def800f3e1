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

use crate::linalg::SVector;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

mod lqr;
pub(crate) mod riccati;
pub use lqr::Lqr;

/// A state feedback controller with `N` states and `M` control inputs.
pub trait Controller<const N: usize, const M: usize> {
    /// Computes the control acceleration driving `state` toward `reference`.
    fn control(&self, state: &SVector<f64, N>, reference: &SVector<f64, N>) -> SVector<f64, M>;
}

/// Scalar weights of the LQR cost: the state weight matrix is `Q = state_weight * I` and the control weight
/// matrix is `R = control_weight * I`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub state_weight: f64,
    pub control_weight: f64,
}

impl CostWeights {
    pub fn new(state_weight: f64, control_weight: f64) -> Self {
        Self {
            state_weight,
            control_weight,
        }
    }

    /// Both weights must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), ControlError> {
        ensure!(
            self.state_weight.is_finite()
                && self.state_weight > 0.0
                && self.control_weight.is_finite()
                && self.control_weight > 0.0,
            InvalidCostSnafu {
                state_weight: self.state_weight,
                control_weight: self.control_weight
            }
        );
        Ok(())
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self::new(1e3, 1e5)
    }
}

impl fmt::Display for CostWeights {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Q = {:e} I, R = {:e} I", self.state_weight, self.control_weight)
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ControlError {
    #[snafu(display(
        "LQR weights must be finite and positive, got Q = {state_weight}, R = {control_weight}"
    ))]
    InvalidCost {
        state_weight: f64,
        control_weight: f64,
    },
    #[snafu(display(
        "system is not controllable: controllability matrix has rank {rank} instead of {expected}"
    ))]
    Uncontrollable { rank: usize, expected: usize },
    #[snafu(display("Hamiltonian iterate became singular at iteration {iteration}"))]
    SingularHamiltonian { iteration: usize },
    #[snafu(display("matrix sign function did not converge after {iterations} iterations"))]
    SignIterationDiverged { iterations: usize },
    #[snafu(display("could not extract the Riccati solution: {msg}"))]
    RiccatiExtraction { msg: &'static str },
    #[snafu(display("Riccati solution residual too large: {residual:e}"))]
    RiccatiResidual { residual: f64 },
}
