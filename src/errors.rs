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

use crate::control::ControlError;
use crate::dynamics::DynamicsError;
use crate::guidance::GuidanceError;
use crate::io::{ConfigError, RecordError};
use crate::md::{MissionError, PhaseError};
use crate::vessel::VesselError;
use snafu::prelude::*;

/// Top level error, every module error converts into it with `?`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RendezvousError {
    #[snafu(context(false), display("dynamics: {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(context(false), display("control synthesis: {source}"))]
    Control { source: ControlError },
    #[snafu(context(false), display("guidance: {source}"))]
    Guidance { source: GuidanceError },
    #[snafu(context(false), display("vessel: {source}"))]
    Vessel { source: VesselError },
    #[snafu(context(false), display("phase: {source}"))]
    Phase { source: PhaseError },
    #[snafu(context(false), display("mission aborted: {source}"))]
    Mission { source: MissionError },
    #[snafu(context(false), display("configuration: {source}"))]
    Config { source: ConfigError },
    #[snafu(context(false), display("flight records: {source}"))]
    Record { source: RecordError },
}
