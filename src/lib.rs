pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod physics;
pub mod results;
pub mod solver;

// Flat re-exports for the common entry points
pub use config::SolverConfig;
pub use error::{GeometryError, ParseError, SolverError};
pub use geometry::{Geometry, Surface};
pub use solver::{run_series, AbortFlag, SeriesOutcome};

pub mod atmosphere {
    pub use crate::physics::atmosphere::*;
}
