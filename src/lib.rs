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

/*! # nyx-rendezvous

Autonomous orbital rendezvous guidance, navigation and control.

A chaser spacecraft is brought from a lower orbit to the close vicinity of a target through four phases:
orbit raise, phasing, homing (a Clohessy-Wiltshire Hohmann transfer tracked by an LQR controller) and
closed loop close range maneuvers along smooth quintic profiles.

The vessel itself (telemetry, engines, RCS, time warp) is abstracted behind the traits of [`vessel`], and
[`sim`] provides deterministic implementations of those traits.
*/

/// Clohessy-Wiltshire linearized relative dynamics, split into the in-plane and out-of-plane partitions.
pub mod dynamics;

/// Celestial body parameters and the two-body relations needed to plan the orbital maneuvers.
pub mod cosmic;

/// Continuous time LQR synthesis (CARE solver) and the resulting state feedback controllers.
pub mod control;

/// Reference trajectory generators: closed form Clohessy-Wiltshire solution and smooth polynomial profiles.
pub mod guidance;

/// Onboard navigation, i.e. the estimate of the relative state fed to the controllers.
pub mod nav;

/// Interfaces to the controlled vessel and its environment.
pub mod vessel;

/// Mission design: the rendezvous phases and their sequencer.
pub mod md;

/// Mission configuration and flight records.
pub mod io;

/// Deterministic simulated environments implementing the vessel interfaces.
pub mod sim;

/// Polynomial module
pub mod polyfit;

/// Relative state of the chaser with respect to the target.
pub mod state;

mod errors;
/// Functions which may fail return an error, and all of the errors of this crate convert into this one.
pub use self::errors::RendezvousError;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::state::{InPlaneState, OutOfPlaneState, RelativeState};
