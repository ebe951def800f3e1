mod close_range;
mod config;
mod homing;
mod orbital_phases;
