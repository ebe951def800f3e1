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

use crate::linalg::{Vector2, Vector3, Vector4, Vector6};
use std::fmt;

/// In-plane relative state: radial (m), along-track (m), radial velocity (m/s), along-track velocity (m/s).
///
/// The radial axis is the anti-radial (R-bar) direction: it is positive when the chaser is below the target.
pub type InPlaneState = Vector4<f64>;

/// Out-of-plane relative state: cross-track (m), cross-track velocity (m/s).
pub type OutOfPlaneState = Vector2<f64>;

/// Relative state of the chaser, partitioned the way the Clohessy-Wiltshire equations decouple.
///
/// The partitions are distinct fixed size types, so feeding the out-of-plane state to the in-plane controller
/// does not compile.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RelativeState {
    pub in_plane: InPlaneState,
    pub out_of_plane: OutOfPlaneState,
}

impl RelativeState {
    pub fn new(in_plane: InPlaneState, out_of_plane: OutOfPlaneState) -> Self {
        Self {
            in_plane,
            out_of_plane,
        }
    }

    /// Repartitions a (radial, along-track, cross-track) position and velocity pair.
    pub fn from_cartesian(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            in_plane: Vector4::new(position.x, position.y, velocity.x, velocity.y),
            out_of_plane: Vector2::new(position.z, velocity.z),
        }
    }

    /// Position in meters, ordered radial, along-track, cross-track
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.in_plane[0], self.in_plane[1], self.out_of_plane[0])
    }

    /// Velocity in meters per second
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.in_plane[2], self.in_plane[3], self.out_of_plane[1])
    }

    /// Position and velocity stacked in a single vector.
    pub fn to_cartesian(&self) -> Vector6<f64> {
        let r = self.position();
        let v = self.velocity();
        Vector6::new(r.x, r.y, r.z, v.x, v.y, v.z)
    }
}

impl fmt::Display for RelativeState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = self.position();
        let v = self.velocity();
        write!(
            f,
            "[{:.2}, {:.2}, {:.2}] m\t[{:.4}, {:.4}, {:.4}] m/s",
            r.x, r.y, r.z, v.x, v.y, v.z
        )
    }
}

#[test]
fn repartition() {
    let state =
        RelativeState::from_cartesian(Vector3::new(1.0, 2.0, 3.0), Vector3::new(4.0, 5.0, 6.0));
    assert_eq!(state.in_plane, Vector4::new(1.0, 2.0, 4.0, 5.0));
    assert_eq!(state.out_of_plane, Vector2::new(3.0, 6.0));
    assert_eq!(state.position(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(state.velocity(), Vector3::new(4.0, 5.0, 6.0));
    assert_eq!(
        state.to_cartesian(),
        Vector6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0)
    );
    println!("{state}");
}
