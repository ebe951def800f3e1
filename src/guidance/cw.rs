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

use super::{Guidance, GuidanceError, InvalidGuidanceRateSnafu, InvalidTimeSnafu};
use crate::linalg::Vector3;
use crate::state::RelativeState;
use snafu::ensure;

/// Free drift reference trajectory from the analytical solution of the Clohessy-Wiltshire equations.
///
/// `reference(tau)` takes `tau` in seconds elapsed since the initial state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosedFormGuidance {
    n: f64,
    r0: Vector3<f64>,
    v0: Vector3<f64>,
}

impl ClosedFormGuidance {
    pub fn new(
        orbital_rate: f64,
        initial_position: Vector3<f64>,
        initial_velocity: Vector3<f64>,
    ) -> Result<Self, GuidanceError> {
        ensure!(
            orbital_rate.is_finite() && orbital_rate > 0.0,
            InvalidGuidanceRateSnafu { rate: orbital_rate }
        );
        Ok(Self {
            n: orbital_rate,
            r0: initial_position,
            v0: initial_velocity,
        })
    }

    pub fn initial_state(&self) -> RelativeState {
        RelativeState::from_cartesian(self.r0, self.v0)
    }

    /// Relative state `tau` seconds after the initial state.
    pub fn state_at(&self, tau: f64) -> RelativeState {
        let n = self.n;
        let (x0, y0, z0) = (self.r0.x, self.r0.y, self.r0.z);
        let (vx0, vy0, vz0) = (self.v0.x, self.v0.y, self.v0.z);
        let (sin_nt, cos_nt) = (n * tau).sin_cos();

        let x = (2.0 * vy0 / n - 3.0 * x0) * cos_nt + vx0 / n * sin_nt + (4.0 * x0 - 2.0 * vy0 / n);
        let y = (4.0 * vy0 / n - 6.0 * x0) * sin_nt - 2.0 * vx0 / n * cos_nt
            + (6.0 * n * x0 - 3.0 * vy0) * tau
            + (y0 + 2.0 * vx0 / n);
        let z = z0 * cos_nt + vz0 / n * sin_nt;

        let vx = -(2.0 * vy0 - 3.0 * n * x0) * sin_nt + vx0 * cos_nt;
        let vy = (4.0 * vy0 - 6.0 * n * x0) * cos_nt
            + 2.0 * vx0 * sin_nt
            + (6.0 * n * x0 - 3.0 * vy0);
        let vz = -z0 * n * sin_nt + vz0 * cos_nt;

        RelativeState::from_cartesian(Vector3::new(x, y, z), Vector3::new(vx, vy, vz))
    }
}

impl Guidance for ClosedFormGuidance {
    fn reference(&self, tau: f64) -> Result<RelativeState, GuidanceError> {
        ensure!(tau.is_finite() && tau >= 0.0, InvalidTimeSnafu { tau });
        Ok(self.state_at(tau))
    }
}

#[cfg(test)]
mod ut_cw_guidance {
    use super::*;
    use crate::dynamics::{InPlaneDynamics, LinearDynamics};
    use crate::linalg::Vector2;
    use std::f64::consts::PI;

    #[test]
    fn initial_state_is_reproduced() {
        let r0 = Vector3::new(200.0, -1500.0, 12.0);
        let v0 = Vector3::new(0.1, 0.35, -0.02);
        let guid = ClosedFormGuidance::new(1e-3, r0, v0).unwrap();
        let state = guid.reference(0.0).unwrap();
        assert!((state.position() - r0).norm() < 1e-9);
        assert!((state.velocity() - v0).norm() < 1e-12);
        assert_eq!(guid.initial_state(), RelativeState::from_cartesian(r0, v0));
    }

    #[test]
    fn velocity_is_derivative_of_position() {
        let guid = ClosedFormGuidance::new(
            1.2e-3,
            Vector3::new(150.0, 300.0, -20.0),
            Vector3::new(-0.05, 0.2, 0.01),
        )
        .unwrap();
        let dt = 1e-3;
        for tau in [10.0, 500.0, 2000.0, 4321.0] {
            let fd = (guid.state_at(tau + dt).position() - guid.state_at(tau - dt).position())
                / (2.0 * dt);
            assert!((fd - guid.state_at(tau).velocity()).norm() < 1e-6, "tau = {tau}");
        }
    }

    #[test]
    fn satisfies_cw_dynamics() {
        // The acceleration of the analytical solution matches A x for the in-plane dynamics
        let n = 1e-3;
        let dynamics = InPlaneDynamics::new(n).unwrap();
        let guid = ClosedFormGuidance::new(
            n,
            Vector3::new(100.0, 50.0, 0.0),
            Vector3::new(0.02, 0.1, 0.0),
        )
        .unwrap();
        let dt = 1e-2;
        for tau in [0.5, 1000.0, 3000.0] {
            let acc = (guid.state_at(tau + dt).velocity() - guid.state_at(tau - dt).velocity())
                / (2.0 * dt);
            let xdot = dynamics.eom(&guid.state_at(tau).in_plane, &Vector2::zeros());
            assert!((acc.x - xdot[2]).abs() < 1e-8);
            assert!((acc.y - xdot[3]).abs() < 1e-8);
        }
    }

    #[test]
    fn hohmann_half_period() {
        // Two impulse transfer from 200 m below the target: at half a period the chaser is at the target altitude
        let n = 1e-3;
        let dh = 200.0;
        let guid = ClosedFormGuidance::new(
            n,
            Vector3::new(dh, 0.0, 0.0),
            Vector3::new(0.0, 1.75 * n * dh, 0.0),
        )
        .unwrap();
        let end = guid.reference(PI / n).unwrap();
        assert!(end.position().x.abs() < 1e-9);
        assert!((end.position().y - 3.0 * PI / 4.0 * dh).abs() < 1e-9);
        assert!((end.velocity().y + n * dh / 4.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_inputs() {
        assert!(ClosedFormGuidance::new(0.0, Vector3::zeros(), Vector3::zeros()).is_err());
        let guid = ClosedFormGuidance::new(1e-3, Vector3::zeros(), Vector3::zeros()).unwrap();
        assert_eq!(guid.reference(-1.0), Err(GuidanceError::InvalidTime { tau: -1.0 }));
        assert!(guid.reference(f64::NAN).is_err());
    }
}
