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

use crate::state::RelativeState;
use crate::vessel::TelemetrySource;

/// Onboard estimate of the relative state.
pub trait Navigation {
    fn output(&self) -> RelativeState;
}

/// Navigation with full knowledge of the relative state: the telemetry is taken as is.
///
/// Telemetry is sampled again on every call, nothing is cached between control cycles.
#[derive(Copy, Clone)]
pub struct FullKnowledgeNavigation<'a> {
    telemetry: &'a dyn TelemetrySource,
}

impl<'a> FullKnowledgeNavigation<'a> {
    pub fn new(telemetry: &'a dyn TelemetrySource) -> Self {
        Self { telemetry }
    }
}

impl Navigation for FullKnowledgeNavigation<'_> {
    fn output(&self) -> RelativeState {
        RelativeState::from_cartesian(
            self.telemetry.relative_position(),
            self.telemetry.relative_velocity(),
        )
    }
}
