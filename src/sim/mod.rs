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

use crate::dynamics::LinearDynamics;
use crate::linalg::SVector;

mod kepler;
mod relative;

pub use kepler::{KeplerOrbit, KeplerOrbitView, KeplerWorld};
pub use relative::{RelativeMotionSim, RelativeOrbitView};

/// Which of the two vessels an orbit view describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Vessel {
    Chaser,
    Target,
}

/// A coefficients of the Butcher table of the classical Runge Kutta 4, lower triangle, row major.
const RK4_A_COEFFS: [f64; 6] = [0.5, 0.0, 0.5, 0.0, 0.0, 1.0];
const RK4_B_COEFFS: [f64; 4] = [1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0];

/// Single fixed step of RK4, the control being held over the step.
pub(crate) fn rk4_step<D, const N: usize, const M: usize>(
    dynamics: &D,
    state: &SVector<f64, N>,
    control: &SVector<f64, M>,
    step_size: f64,
) -> SVector<f64, N>
where
    D: LinearDynamics<N, M>,
{
    let mut k = [SVector::<f64, N>::zeros(); 4];
    k[0] = dynamics.eom(state, control);
    let mut a_idx = 0;
    for i in 0..3 {
        let mut wi = SVector::<f64, N>::zeros();
        for kj in &k[0..=i] {
            wi += RK4_A_COEFFS[a_idx] * kj;
            a_idx += 1;
        }
        k[i + 1] = dynamics.eom(&(state + step_size * wi), control);
    }

    let mut next_state = *state;
    for (b_i, ki) in RK4_B_COEFFS.iter().zip(k.iter()) {
        next_state += step_size * *b_i * ki;
    }
    next_state
}

/// Splits `duration` into steps no larger than `max_step`, the last one being shorter if needed.
pub(crate) fn substeps(duration: f64, max_step: f64) -> impl Iterator<Item = f64> {
    let full = (duration / max_step).floor() as usize;
    let remainder = duration - full as f64 * max_step;
    std::iter::repeat(max_step)
        .take(full)
        .chain((remainder > 1e-12).then_some(remainder))
}

#[cfg(test)]
mod ut_sim {
    use super::*;
    use crate::dynamics::OutOfPlaneDynamics;
    use crate::linalg::{Vector1, Vector2};

    #[test]
    fn rk4_harmonic_oscillator() {
        // The out-of-plane motion is a harmonic oscillator at the orbital rate
        let n = 1e-3;
        let dynamics = OutOfPlaneDynamics::new(n).unwrap();
        let mut state = Vector2::new(10.0, 0.0);
        let dt = 1.0;
        let quarter = std::f64::consts::FRAC_PI_2 / n;
        for step in substeps(quarter, dt) {
            state = rk4_step(&dynamics, &state, &Vector1::zeros(), step);
        }
        assert!(state[0].abs() < 1e-6);
        assert!((state[1] + 10.0 * n).abs() < 1e-9);
    }

    #[test]
    fn substep_split() {
        let steps: Vec<f64> = substeps(0.25, 0.1).collect();
        assert_eq!(steps.len(), 3);
        assert!((steps.iter().sum::<f64>() - 0.25).abs() < 1e-12);
        assert_eq!(substeps(0.0, 0.1).count(), 0);
        assert_eq!(substeps(0.2, 0.1).count(), 2);
    }
}
