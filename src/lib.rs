//! Geodesic sphere meshes and a finite-volume shallow-water model on them.
//!
//! The pipeline runs icosahedron, subdivision, projection, dual
//! ([`geometry`]), then flat per-entity tables and discrete operators
//! ([`numerics`]), then typed fields ([`fields`]) advanced by the
//! [`sim::Simulation`] driver.

pub mod error;
pub mod fields;
pub mod geometry;
pub mod numerics;
pub mod sim;
pub mod util;

pub use error::{Result, SimulationError};
