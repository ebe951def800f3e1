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

#[macro_use]
extern crate log;

use clap::Parser;
use nyx_rendezvous::io::{ConfigRepr, FlightLog, MissionConfig, ScenarioConfig};
use nyx_rendezvous::md::{CloseRangeManeuver, Gnc, Homing, Mission, MissionContext};
use nyx_rendezvous::sim::{RelativeMotionSim, Vessel};
use nyx_rendezvous::RendezvousError;
use std::env::{set_var, var};
use std::path::PathBuf;

const LOG_VAR: &str = "RENDEZVOUS_LOG";

/// Flies the homing and close range phases of a rendezvous against the relative motion simulator.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Mission configuration (YAML), defaults are used if not provided
    config: Option<PathBuf>,

    /// Initial conditions of the simulation (YAML)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Exports every control cycle to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<(), RendezvousError> {
    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::default(),
    };
    cfg.validate()?;

    let scenario = match &cli.scenario {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::default(),
    };
    let orbital_rate = cfg.body.orbital_rate(scenario.target_sma_m);
    let scenario = scenario.with_circular_drift(orbital_rate);
    info!("Central body: {}", cfg.body);

    let gnc = Gnc::synthesize(orbital_rate, cfg.costs)?;
    let sim = RelativeMotionSim::from_scenario(cfg.body.clone(), &scenario)?;
    let chaser = sim.orbit(Vessel::Chaser);
    let target = sim.orbit(Vessel::Target);
    let log = FlightLog::new();
    let ctx = MissionContext::new(&sim, &chaser, &target, &cfg.body, &gnc, &log);

    let mut mission = Mission::from_phases(vec![
        Homing::new(cfg.homing.clone()).into(),
        CloseRangeManeuver::new(cfg.close_range.clone()).into(),
    ])?;
    let rslt = mission.run(&ctx);

    for (kind, status) in mission.statuses() {
        info!("{kind}: {status:?}");
    }
    info!("Final relative state: {}", sim.state());

    if let Some(path) = &cli.csv {
        log.write_csv(path)?;
    }

    Ok(rslt?)
}
