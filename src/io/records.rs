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

use crate::linalg::Vector3;
use crate::md::PhaseKind;
use crate::state::RelativeState;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;

/// One closed loop control cycle, flattened so that it maps onto a CSV row.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub ut_s: f64,
    pub phase: PhaseKind,
    /// Guidance time: seconds for homing, normalized for the close range maneuvers
    pub tau: f64,
    pub nav_x_m: f64,
    pub nav_y_m: f64,
    pub nav_z_m: f64,
    pub nav_vx_m_s: f64,
    pub nav_vy_m_s: f64,
    pub nav_vz_m_s: f64,
    pub ref_x_m: f64,
    pub ref_y_m: f64,
    pub ref_z_m: f64,
    pub ref_vx_m_s: f64,
    pub ref_vy_m_s: f64,
    pub ref_vz_m_s: f64,
    pub u_x_m_s2: f64,
    pub u_y_m_s2: f64,
    pub u_z_m_s2: f64,
    pub u_body_x_m_s2: f64,
    pub u_body_y_m_s2: f64,
    pub u_body_z_m_s2: f64,
    /// Whether the command was sent to the actuators during this cycle
    pub actuated: bool,
}

impl CycleRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ut_s: f64,
        phase: PhaseKind,
        tau: f64,
        nav: &RelativeState,
        reference: &RelativeState,
        command: Vector3<f64>,
        body_command: Vector3<f64>,
        actuated: bool,
    ) -> Self {
        let nav = nav.to_cartesian();
        let reference = reference.to_cartesian();
        Self {
            ut_s,
            phase,
            tau,
            nav_x_m: nav[0],
            nav_y_m: nav[1],
            nav_z_m: nav[2],
            nav_vx_m_s: nav[3],
            nav_vy_m_s: nav[4],
            nav_vz_m_s: nav[5],
            ref_x_m: reference[0],
            ref_y_m: reference[1],
            ref_z_m: reference[2],
            ref_vx_m_s: reference[3],
            ref_vy_m_s: reference[4],
            ref_vz_m_s: reference[5],
            u_x_m_s2: command.x,
            u_y_m_s2: command.y,
            u_z_m_s2: command.z,
            u_body_x_m_s2: body_command.x,
            u_body_y_m_s2: body_command.y,
            u_body_z_m_s2: body_command.z,
            actuated,
        }
    }

    pub fn nav_position(&self) -> Vector3<f64> {
        Vector3::new(self.nav_x_m, self.nav_y_m, self.nav_z_m)
    }

    pub fn reference_position(&self) -> Vector3<f64> {
        Vector3::new(self.ref_x_m, self.ref_y_m, self.ref_z_m)
    }

    pub fn command(&self) -> Vector3<f64> {
        Vector3::new(self.u_x_m_s2, self.u_y_m_s2, self.u_z_m_s2)
    }
}

/// Receives every control cycle of the closed loop phases.
pub trait FlightRecorder {
    fn record(&self, record: CycleRecord);
}

/// Discards everything.
impl FlightRecorder for () {
    fn record(&self, _record: CycleRecord) {}
}

/// In memory flight log, exported as CSV once the mission is over.
#[derive(Debug, Default)]
pub struct FlightLog {
    records: RefCell<Vec<CycleRecord>>,
}

impl FlightLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<CycleRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Records of a single phase.
    pub fn phase(&self, kind: PhaseKind) -> Vec<CycleRecord> {
        self.records
            .borrow()
            .iter()
            .filter(|r| r.phase == kind)
            .copied()
            .collect()
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), RecordError> {
        let wtr = csv::Writer::from_path(&path).context(CsvSnafu {
            action: "creating the output file",
        })?;
        self.serialize_into(wtr)?;
        info!(
            "Saved {} control cycles to {}",
            self.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    /// Writes the records as CSV, with headers, into any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), RecordError> {
        self.serialize_into(csv::Writer::from_writer(writer))
    }

    fn serialize_into<W: Write>(&self, mut wtr: csv::Writer<W>) -> Result<(), RecordError> {
        for record in self.records.borrow().iter() {
            wtr.serialize(record).context(CsvSnafu {
                action: "serializing a control cycle",
            })?;
        }
        wtr.flush().context(FlushSnafu)
    }
}

impl FlightRecorder for FlightLog {
    fn record(&self, record: CycleRecord) {
        self.records.borrow_mut().push(record);
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RecordError {
    #[snafu(display("CSV error when {action}: {source}"))]
    Csv {
        action: &'static str,
        source: csv::Error,
    },
    #[snafu(display("could not flush the flight records: {source}"))]
    Flush { source: std::io::Error },
}

impl PartialEq for RecordError {
    /// No two record errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}
