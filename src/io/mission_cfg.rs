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

use super::{duration_from_str, duration_to_str, ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::control::CostWeights;
use crate::cosmic::CelestialBody;
use crate::md::{CloseRangeSettings, HomingSettings, PhasingStrategy};
use crate::time::{Duration, Unit};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use typed_builder::TypedBuilder;

/// Tunable parameters of a rendezvous mission.
///
/// Every field has a default, so a YAML document only needs to list what differs from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct MissionConfig {
    #[builder(default = CelestialBody::kerbin())]
    pub body: CelestialBody,
    #[builder(default)]
    pub costs: CostWeights,
    /// Distance kept below the target orbit at the end of phasing, in meters
    #[builder(default = 2000.0)]
    pub r_bar_safety_distance_m: f64,
    /// Phase angle by which the target leads the chaser at the end of phasing, in degrees
    #[builder(default = 3.0)]
    pub final_phase_offset_deg: f64,
    #[builder(default)]
    pub phasing: PhasingStrategy,
    #[builder(default)]
    pub homing: HomingSettings,
    #[builder(default)]
    pub close_range: CloseRangeSettings,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = self.costs.validate() {
            return InvalidConfigSnafu {
                msg: format!("{e}"),
            }
            .fail();
        }
        ensure!(
            self.body.gm_m3_s2 > 0.0,
            InvalidConfigSnafu {
                msg: format!("gravitational parameter of {} must be positive", self.body.name)
            }
        );
        ensure!(
            self.r_bar_safety_distance_m >= 0.0,
            InvalidConfigSnafu {
                msg: "R bar safety distance must be non negative"
            }
        );
        ensure!(
            self.final_phase_offset_deg.abs() < 180.0,
            InvalidConfigSnafu {
                msg: format!(
                    "final phase offset of {} deg is not within (-180, 180)",
                    self.final_phase_offset_deg
                )
            }
        );
        ensure!(
            (0.0..0.5).contains(&self.homing.coast_fraction),
            InvalidConfigSnafu {
                msg: format!(
                    "homing coast fraction of {} is not within [0, 0.5)",
                    self.homing.coast_fraction
                )
            }
        );
        ensure!(
            self.homing.control_period > Duration::ZERO
                && self.close_range.control_period > Duration::ZERO,
            InvalidConfigSnafu {
                msg: "control periods must be positive"
            }
        );
        for (i, segment) in self.close_range.segments.iter().enumerate() {
            ensure!(
                segment.duration > Duration::ZERO && segment.tolerance_m > 0.0,
                InvalidConfigSnafu {
                    msg: format!("close range segment #{i} needs a positive duration and tolerance")
                }
            );
        }
        Ok(())
    }
}

impl ConfigRepr for MissionConfig {}

/// Measurement noise of the simulated telemetry.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoiseSettings {
    pub position_sigma_m: f64,
    pub velocity_sigma_m_s: f64,
    pub seed: u64,
}

/// Initial conditions of a simulated rendezvous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Radius of the circular target orbit
    #[builder(default = 900_000.0)]
    pub target_sma_m: f64,
    /// Relative position of the chaser in the local orbital frame (m)
    #[builder(default = [200.0, -3000.0, 0.0])]
    pub initial_position_m: [f64; 3],
    #[builder(default = [0.0, 0.0, 0.0])]
    pub initial_velocity_m_s: [f64; 3],
    /// Saturation of the RCS on each body axis, unlimited if not set
    #[builder(default, setter(strip_option))]
    pub rcs_max_accel_m_s2: Option<f64>,
    #[builder(default, setter(strip_option))]
    pub nav_noise: Option<NoiseSettings>,
    /// Yaw of the body frame with respect to the local orbital frame
    #[builder(default = 0.0)]
    pub body_yaw_deg: f64,
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    #[builder(default = Unit::Millisecond * 50)]
    pub integration_step: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ScenarioConfig {
    /// Fills in the chaser velocity for a circular drift at the initial radial offset, if none was given.
    pub fn with_circular_drift(mut self, orbital_rate: f64) -> Self {
        if self.initial_velocity_m_s == [0.0; 3] {
            self.initial_velocity_m_s[1] = 1.5 * orbital_rate * self.initial_position_m[0];
        }
        self
    }
}

impl ConfigRepr for ScenarioConfig {}
