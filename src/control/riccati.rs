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
    ControlError, RiccatiExtractionSnafu, RiccatiResidualSnafu, SignIterationDivergedSnafu,
    SingularHamiltonianSnafu,
};
use crate::linalg::DMatrix;
use snafu::{ensure, OptionExt};

/// Maximum number of Newton iterations of the matrix sign function.
const MAX_SIGN_ITER: usize = 100;
/// Relative change between two iterates below which the sign function has converged.
const SIGN_TOL: f64 = 1e-10;
/// Singular values below this fraction of the largest one are considered null.
const RANK_TOL: f64 = 1e-9;
/// Relative residual accepted for the Riccati solution.
const RESIDUAL_TOL: f64 = 1e-6;

/// Numerical rank of the provided matrix, using a threshold relative to its largest singular value.
pub(crate) fn numerical_rank(mat: &DMatrix<f64>) -> usize {
    let sv = mat.clone().singular_values();
    let max_sv = sv.max();
    if max_sv <= 0.0 {
        return 0;
    }
    sv.iter().filter(|s| **s > RANK_TOL * max_sv).count()
}

/// Solves the continuous algebraic Riccati equation `A'P + PA - P B R^-1 B' P + Q = 0`.
///
/// The stabilizing solution is extracted from the stable invariant subspace of the Hamiltonian matrix
/// `H = [A, -B R^-1 B'; -Q, -A']`, computed with the determinant scaled Newton iteration of the matrix sign
/// function. With `W = sign(H)`, `P` solves `[W12; W22 + I] P = -[W11 + I; W21]` in the least squares sense.
pub(crate) fn solve_care(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
) -> Result<DMatrix<f64>, ControlError> {
    let n = a.nrows();
    let r_inv = r
        .clone()
        .try_inverse()
        .context(RiccatiExtractionSnafu {
            msg: "control weight matrix is singular",
        })?;
    let s = b * r_inv * b.transpose();

    let hamiltonian = DMatrix::from_fn(2 * n, 2 * n, |i, j| match (i < n, j < n) {
        (true, true) => a[(i, j)],
        (true, false) => -s[(i, j - n)],
        (false, true) => -q[(i - n, j)],
        (false, false) => -a[(j - n, i - n)],
    });

    let w = matrix_sign(hamiltonian)?;

    let lhs = DMatrix::from_fn(2 * n, n, |i, j| {
        if i < n {
            w[(i, j + n)]
        } else {
            w[(i, j + n)] + if i - n == j { 1.0 } else { 0.0 }
        }
    });
    let rhs = DMatrix::from_fn(2 * n, n, |i, j| {
        if i < n {
            -(w[(i, j)] + if i == j { 1.0 } else { 0.0 })
        } else {
            -w[(i, j)]
        }
    });

    let p = lhs
        .svd(true, true)
        .solve(&rhs, f64::EPSILON)
        .map_err(|msg| ControlError::RiccatiExtraction { msg })?;
    let p = (&p + p.transpose()) * 0.5;

    let residual = care_residual(a, &s, q, &p);
    debug!("CARE solved with relative residual {residual:e}");
    ensure!(
        residual.is_finite() && residual < RESIDUAL_TOL,
        RiccatiResidualSnafu { residual }
    );

    Ok(p)
}

/// Relative Frobenius norm of the Riccati equation residual.
fn care_residual(a: &DMatrix<f64>, s: &DMatrix<f64>, q: &DMatrix<f64>, p: &DMatrix<f64>) -> f64 {
    let lin = a.transpose() * p + p * a;
    let quad = p * s * p;
    let res = &lin - &quad + q;
    res.norm() / (lin.norm() + quad.norm() + q.norm())
}

/// Matrix sign function by scaled Newton iteration: `Z <- (c Z + (c Z)^-1) / 2` with `c = |det Z|^(-1/dim)`.
fn matrix_sign(mut z: DMatrix<f64>) -> Result<DMatrix<f64>, ControlError> {
    let dim = z.nrows() as f64;

    for iteration in 0..MAX_SIGN_ITER {
        let det = z.determinant().abs();
        let z_inv = z
            .clone()
            .try_inverse()
            .context(SingularHamiltonianSnafu { iteration })?;
        let c = if det.is_finite() && det > 0.0 {
            det.powf(-1.0 / dim)
        } else {
            1.0
        };

        let z_next = (&z * c + z_inv / c) * 0.5;
        let change = (&z_next - &z).norm();
        let scale = z_next.norm();
        z = z_next;

        if change <= SIGN_TOL * scale {
            debug!("matrix sign function converged in {} iterations", iteration + 1);
            return Ok(z);
        }
    }

    SignIterationDivergedSnafu {
        iterations: MAX_SIGN_ITER,
    }
    .fail()
}
