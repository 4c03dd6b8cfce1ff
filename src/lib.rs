//! SpectRE: lattice reheating simulation driver (`spec.md` §1–§9).
//!
//! This crate wires the `grid`/`field`/`dynamics` library crates into a runnable
//! program: configuration loading, initial-spectrum seeding, and snapshot output.
//! The integration core itself lives entirely in those three crates; nothing here
//! mutates field state directly except by calling into them.

mod config;
mod error;
mod initializer;
mod snapshot;

pub use config::RunConfig;
pub use error::SpectreError;
pub use initializer::{ThermalSpectrum, VacuumSpectrum};
pub use snapshot::{dump_field, energy_density, next_index, FileSnapshotSink, SnapshotSink};

pub type Result<T> = std::result::Result<T, SpectreError>;
