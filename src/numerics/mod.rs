//! Finite-volume machinery: geometry tables, operators, the Poisson solver
//! and the time integrator.

pub mod integrator;
pub mod operators;
mod poisson;
mod tables;

pub use integrator::Scheme;
pub use operators::Operators;
pub use poisson::PoissonSolver;
pub use tables::{Csr, MeshTables};
