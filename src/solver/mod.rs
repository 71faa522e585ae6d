//! Driver for the external vortex-lattice solver: input files, command
//! script, subprocess and per-run scratch directory.

pub mod abort;
pub mod process;
pub mod runner;
pub mod script;
pub mod workdir;

pub use abort::AbortFlag;
pub use process::{classify_output, AvlProcess, Solver};
pub use runner::{run_series, run_series_with, SeriesOutcome, ABORTED};
pub use script::{build_command_script, build_run_case_block, FlightConditions};
pub use workdir::WorkDir;
