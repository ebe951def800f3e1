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

use crate::linalg::{DMatrix, SMatrix, SVector};
use snafu::prelude::*;

/// The Clohessy-Wiltshire relative dynamics of a chaser around a target on a circular orbit.
pub mod cw;
pub use cw::{InPlaneDynamics, OutOfPlaneDynamics};

/// A linear time invariant model `x_dot = A x + B u` with `N` states and `M` inputs.
///
/// The dimensions are part of the type, which is how the in-plane (4, 2) and out-of-plane (2, 1)
/// partitions are kept apart at compile time.
pub trait LinearDynamics<const N: usize, const M: usize> {
    /// Returns the free dynamics matrix `A`.
    fn free_dynamics(&self) -> SMatrix<f64, N, N>;

    /// Returns the control input matrix `B`.
    fn control_input(&self) -> SMatrix<f64, N, M>;

    /// Mean motion of the reference orbit in rad/s.
    fn orbital_rate(&self) -> f64;

    /// Time derivative of the state for the provided control acceleration.
    fn eom(&self, state: &SVector<f64, N>, control: &SVector<f64, M>) -> SVector<f64, N> {
        self.free_dynamics() * state + self.control_input() * control
    }

    /// Controllability matrix `[B, AB, A^2 B, ..., A^(N-1) B]`, of size N x (N*M).
    fn controllability_matrix(&self) -> DMatrix<f64> {
        let a = self.free_dynamics();
        let mut blocks = Vec::with_capacity(N);
        let mut block = self.control_input();
        for _ in 0..N {
            blocks.push(block);
            block = a * block;
        }
        DMatrix::from_fn(N, N * M, |i, j| blocks[j / M][(i, j % M)])
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    #[snafu(display("orbital rate must be finite and strictly positive, got {rate} rad/s"))]
    InvalidOrbitalRate { rate: f64 },
}
