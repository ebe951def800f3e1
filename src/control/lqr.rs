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

use super::riccati::{numerical_rank, solve_care};
use super::{ControlError, Controller, CostWeights, UncontrollableSnafu};
use crate::dynamics::LinearDynamics;
use crate::linalg::{DMatrix, SMatrix, SVector};
use snafu::ensure;
use std::fmt;

/// Infinite horizon, continuous time, linear quadratic regulator.
///
/// The gain is computed once at synthesis and never changes afterward, so a single controller may be shared
/// by every phase of the mission.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lqr<const N: usize, const M: usize> {
    gain: SMatrix<f64, M, N>,
    riccati: SMatrix<f64, N, N>,
    costs: CostWeights,
}

impl<const N: usize, const M: usize> Lqr<N, M> {
    /// Synthesizes the optimal gain `K = R^-1 B' P` of the provided dynamics.
    ///
    /// # Errors
    /// + Weights which are not finite and positive
    /// + Uncontrollable dynamics (controllability matrix not of full rank)
    /// + Failure of the Riccati solver
    pub fn synthesize<D: LinearDynamics<N, M>>(
        dynamics: &D,
        costs: CostWeights,
    ) -> Result<Self, ControlError> {
        costs.validate()?;

        let rank = numerical_rank(&dynamics.controllability_matrix());
        ensure!(rank == N, UncontrollableSnafu { rank, expected: N });

        let a_mat = dynamics.free_dynamics();
        let b_mat = dynamics.control_input();

        let p = solve_care(
            &DMatrix::from_fn(N, N, |i, j| a_mat[(i, j)]),
            &DMatrix::from_fn(N, M, |i, j| b_mat[(i, j)]),
            &(DMatrix::identity(N, N) * costs.state_weight),
            &(DMatrix::identity(M, M) * costs.control_weight),
        )?;

        let riccati = SMatrix::<f64, N, N>::from_fn(|i, j| p[(i, j)]);
        let gain = b_mat.transpose() * riccati / costs.control_weight;

        Ok(Self {
            gain,
            riccati,
            costs,
        })
    }

    /// Optimal gain matrix `K`.
    pub fn gain(&self) -> &SMatrix<f64, M, N> {
        &self.gain
    }

    /// Stabilizing solution `P` of the Riccati equation.
    pub fn riccati(&self) -> &SMatrix<f64, N, N> {
        &self.riccati
    }

    pub fn costs(&self) -> CostWeights {
        self.costs
    }

    /// Cost to go `e' P e` of the tracking error, a Lyapunov function of the closed loop.
    pub fn cost_to_go(&self, error: &SVector<f64, N>) -> f64 {
        (error.transpose() * self.riccati * error)[(0, 0)]
    }
}

impl<const N: usize, const M: usize> Controller<N, M> for Lqr<N, M> {
    /// `u = -K (state - reference)`
    fn control(&self, state: &SVector<f64, N>, reference: &SVector<f64, N>) -> SVector<f64, M> {
        -(self.gain * (state - reference))
    }
}

impl<const N: usize, const M: usize> fmt::Display for Lqr<N, M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LQR ({}) with gain K = {:.6}", self.costs, self.gain)
    }
}
