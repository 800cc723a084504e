//! Stochastic simulation of virus populations under drug treatment.
//!
//! Virus particles clear, survive or reproduce at every time step. Reproduction
//! is suppressed by population density and blocked by any administered drug the
//! particle does not resist; offspring may flip their resistances by mutation.
//! Many independent trials are run and their population counts averaged.

pub mod agent;
pub mod analysis;
pub mod config;
pub mod error;
pub mod manager;
pub mod population;
pub mod runner;
pub mod stats;
pub mod treatment;
pub mod virus;

#[cfg(test)]
mod testing;

pub use agent::{Agent, Reproduction};
pub use error::SimError;
pub use population::Population;
pub use runner::{Batch, TrialRecord, TrialRunner};
pub use treatment::{Dose, Schedule, Treatment};
pub use virus::Virus;
