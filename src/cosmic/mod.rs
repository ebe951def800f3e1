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

use crate::time::{Duration, Unit};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;

/// Minimum altitude above the equatorial radius that a phasing orbit may reach, in meters.
pub const MIN_SAFE_ALTITUDE_M: f64 = 100_000.0;

/// Gravitational parameters of the central body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub name: String,
    /// Gravitational parameter in m^3/s^2
    pub gm_m3_s2: f64,
    /// Equatorial radius in meters
    pub equatorial_radius_m: f64,
}

impl CelestialBody {
    pub fn earth() -> Self {
        Self {
            name: "Earth".to_string(),
            gm_m3_s2: 3.986_004_418e14,
            equatorial_radius_m: 6_378_137.0,
        }
    }

    pub fn kerbin() -> Self {
        Self {
            name: "Kerbin".to_string(),
            gm_m3_s2: 3.531_6e12,
            equatorial_radius_m: 600_000.0,
        }
    }

    /// Vis-viva: orbital velocity at radius `radius_m` on an orbit of semi-major axis `sma_m`.
    pub fn orbital_velocity(&self, radius_m: f64, sma_m: f64) -> f64 {
        (self.gm_m3_s2 * (2.0 / radius_m - 1.0 / sma_m)).sqrt()
    }

    /// Impulse needed at `radius_m` to go from the current semi-major axis to the new one.
    /// Positive means prograde.
    pub fn delta_v(&self, radius_m: f64, current_sma_m: f64, new_sma_m: f64) -> f64 {
        self.orbital_velocity(radius_m, new_sma_m) - self.orbital_velocity(radius_m, current_sma_m)
    }

    /// Mean motion in rad/s
    pub fn orbital_rate(&self, sma_m: f64) -> f64 {
        (self.gm_m3_s2 / sma_m.powi(3)).sqrt()
    }

    /// Orbital period in seconds
    pub fn period(&self, sma_m: f64) -> f64 {
        TAU / self.orbital_rate(sma_m)
    }

    pub fn sma_from_apsides(&self, periapsis_m: f64, apoapsis_m: f64) -> f64 {
        (periapsis_m + apoapsis_m) / 2.0
    }

    pub fn sma_from_period(&self, period_s: f64) -> f64 {
        (period_s * self.gm_m3_s2.sqrt() / TAU).powf(2.0 / 3.0)
    }

    /// Returns the other apsis of the orbit of period `period_s` which has `apsis_m` as one of its apsides.
    pub fn apsis_from_period_and_apsis(&self, period_s: f64, apsis_m: f64) -> f64 {
        2.0 * self.sma_from_period(period_s) - apsis_m
    }

    /// Lowest radius an orbit may reach while staying `min_altitude_m` above the equator.
    pub fn min_safe_radius(&self, min_altitude_m: f64) -> f64 {
        self.equatorial_radius_m + min_altitude_m
    }

    /// Returns whether the phasing orbit of period `period_s` going through `apsis_m` keeps its other apsis
    /// above the safe altitude.
    pub fn phasing_period_valid(&self, period_s: f64, apsis_m: f64, min_altitude_m: f64) -> bool {
        self.apsis_from_period_and_apsis(period_s, apsis_m) > self.min_safe_radius(min_altitude_m)
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (GM = {:e} m^3/s^2, R = {} km)",
            self.name,
            self.gm_m3_s2,
            self.equatorial_radius_m * 1e-3
        )
    }
}

/// Phase angle between the target and the chaser, at the chaser apoapsis.
///
/// Positive when the chaser is behind the target.
pub fn phase_offset(
    target_ta_at_chaser_apo_rad: f64,
    target_aop_rad: f64,
    chaser_aop_rad: f64,
) -> f64 {
    target_ta_at_chaser_apo_rad + target_aop_rad - (PI + chaser_aop_rad)
}

/// Eccentric anomaly swept by the target while covering the phase angle `phase_rad`.
pub fn eccentric_anomaly_difference(target_ecc: f64, phase_rad: f64) -> f64 {
    2.0 * (((1.0 - target_ecc) / (1.0 + target_ecc)).sqrt() * (phase_rad / 2.0).tan()).atan()
}

/// Kepler's equation: time needed to sweep `delta_ea_rad` of eccentric anomaly, in seconds.
pub fn time_difference(delta_ea_rad: f64, target_ecc: f64, target_period_s: f64) -> f64 {
    (delta_ea_rad - target_ecc * delta_ea_rad.sin()) * target_period_s / TAU
}

/// Converts seconds into a hifitime Duration for display, rounded to the second.
pub fn format_duration(seconds: f64) -> Duration {
    Duration::from_seconds(seconds).round(Unit::Second * 1)
}
