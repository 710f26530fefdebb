//! Shallow-water simulation on the geodesic sphere.
//!
//! Height and a passive tracer live on faces, velocity on vertices. The
//! [`Simulation`] advances them with Euler, then third-order Adams-Bashforth;
//! [`SimulationRunner`] runs it on a background thread.

mod config;
mod constants;
pub mod initial;
mod runner;
mod simulation;

pub use config::{DynamicsConfig, InitialConfig, MeshConfig, SimulationConfig};
pub use constants::*;
pub use initial::InitialConditions;
pub use runner::{Command, RunState, SimulationRunner};
pub use simulation::{Simulation, StepDiagnostics};
