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
    Axis, Guidance, GuidanceError, InvalidDurationSnafu, InvalidTimeSnafu,
    ProfileNotConfiguredSnafu,
};
use crate::linalg::Vector3;
use crate::polyfit::Polynomial;
use crate::state::RelativeState;
use snafu::{ensure, OptionExt};
use std::fmt;

/// Normalized shape of a rest-to-rest profile over tau in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProfileShape {
    pub position: Polynomial<6>,
    pub velocity: Polynomial<5>,
    pub acceleration: Polynomial<4>,
}

impl ProfileShape {
    /// Minimum jerk quintic: zero velocity and zero acceleration at both ends.
    pub fn quintic() -> Self {
        Self {
            position: Polynomial::new([0.0, 0.0, 0.0, 10.0, -15.0, 6.0]),
            velocity: Polynomial::new([0.0, 0.0, 30.0, -60.0, 30.0]),
            acceleration: Polynomial::new([0.0, 60.0, -180.0, 120.0]),
        }
    }
}

impl Default for ProfileShape {
    fn default() -> Self {
        Self::quintic()
    }
}

impl fmt::Display for ProfileShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "position {}\tvelocity {}",
            self.position, self.velocity
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ProfileBounds {
    initial: f64,
    target: f64,
    duration: f64,
}

/// Single axis profile going from an initial to a final position in a given duration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothProfile {
    axis: Axis,
    shape: ProfileShape,
    bounds: Option<ProfileBounds>,
}

impl SmoothProfile {
    pub fn new(axis: Axis, shape: ProfileShape) -> Self {
        Self {
            axis,
            shape,
            bounds: None,
        }
    }

    /// Sets the boundary conditions of this profile, replacing any previous ones.
    pub fn config_profile(
        &mut self,
        initial: f64,
        target: f64,
        duration: f64,
    ) -> Result<(), GuidanceError> {
        ensure!(
            duration.is_finite() && duration > 0.0,
            InvalidDurationSnafu { duration }
        );
        self.bounds = Some(ProfileBounds {
            initial,
            target,
            duration,
        });
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.bounds.is_some()
    }

    fn bounds(&self) -> Result<&ProfileBounds, GuidanceError> {
        self.bounds
            .as_ref()
            .context(ProfileNotConfiguredSnafu { axis: self.axis })
    }

    /// Position (m) at normalized time tau
    pub fn position(&self, tau: f64) -> Result<f64, GuidanceError> {
        let b = self.bounds()?;
        Ok(b.initial + (b.target - b.initial) * self.shape.position.eval(tau))
    }

    /// Velocity (m/s) at normalized time tau
    pub fn velocity(&self, tau: f64) -> Result<f64, GuidanceError> {
        let b = self.bounds()?;
        Ok((b.target - b.initial) / b.duration * self.shape.velocity.eval(tau))
    }

    /// Acceleration (m/s^2) at normalized time tau
    pub fn acceleration(&self, tau: f64) -> Result<f64, GuidanceError> {
        let b = self.bounds()?;
        Ok((b.target - b.initial) / b.duration.powi(2) * self.shape.acceleration.eval(tau))
    }
}

/// Smooth reference trajectory made of one profile per axis of the local orbital frame.
///
/// Configuration requires a mutable borrow and evaluation a shared one, so the profiles cannot be
/// reconfigured while a reference is being computed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothGuidance {
    profiles: [SmoothProfile; 3],
}

impl SmoothGuidance {
    pub fn new(shape: ProfileShape) -> Self {
        Self {
            profiles: Axis::ALL.map(|axis| SmoothProfile::new(axis, shape)),
        }
    }

    pub fn profile(&self, axis: Axis) -> &SmoothProfile {
        &self.profiles[axis.index()]
    }

    pub fn config_profile(
        &mut self,
        axis: Axis,
        initial: f64,
        target: f64,
        duration: f64,
    ) -> Result<(), GuidanceError> {
        self.profiles[axis.index()].config_profile(initial, target, duration)
    }

    /// Configures all three axes to go from `initial` to `target` (m) in `duration` seconds.
    pub fn configure(
        &mut self,
        initial: Vector3<f64>,
        target: Vector3<f64>,
        duration: f64,
    ) -> Result<(), GuidanceError> {
        for axis in Axis::ALL {
            let i = axis.index();
            self.config_profile(axis, initial[i], target[i], duration)?;
        }
        Ok(())
    }

    /// Feed forward acceleration of the reference at normalized time tau.
    pub fn acceleration(&self, tau: f64) -> Result<Vector3<f64>, GuidanceError> {
        let tau = clamp_tau(tau)?;
        Ok(Vector3::new(
            self.profiles[0].acceleration(tau)?,
            self.profiles[1].acceleration(tau)?,
            self.profiles[2].acceleration(tau)?,
        ))
    }
}

impl Default for SmoothGuidance {
    fn default() -> Self {
        Self::new(ProfileShape::quintic())
    }
}

fn clamp_tau(tau: f64) -> Result<f64, GuidanceError> {
    ensure!(!tau.is_nan(), InvalidTimeSnafu { tau });
    Ok(tau.clamp(0.0, 1.0))
}

impl Guidance for SmoothGuidance {
    /// Reference at normalized time `tau`, held at the end points outside of [0, 1].
    fn reference(&self, tau: f64) -> Result<RelativeState, GuidanceError> {
        let tau = clamp_tau(tau)?;
        let mut position = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        for (i, profile) in self.profiles.iter().enumerate() {
            position[i] = profile.position(tau)?;
            velocity[i] = profile.velocity(tau)?;
        }
        Ok(RelativeState::from_cartesian(position, velocity))
    }
}
