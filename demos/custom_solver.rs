//! Plugging a custom `Solver` into a series: this one only prints what the
//! real executable would receive and reports every case as missing.
//!
//!     cargo run --example custom_solver

use std::fs;
use std::path::Path;

use avl_bridge::geometry::presets;
use avl_bridge::solver::{run_series_with, AbortFlag, Solver};
use avl_bridge::SolverError;

struct DryRun;

impl Solver for DryRun {
    fn execute(&self, script: &str, geometry_file: &Path, working_dir: &Path) -> Result<String, SolverError> {
        println!("--- working directory: {}", working_dir.display());
        for entry in fs::read_dir(working_dir)? {
            println!("    {}", entry?.file_name().to_string_lossy());
        }
        println!("--- run cases:");
        print!("{}", fs::read_to_string(geometry_file.with_extension("run"))?);
        println!("--- command script:");
        print!("{}", script);
        Ok(String::new())
    }

    fn name(&self) -> &str {
        "dry-run"
    }
}

fn main() {
    let geometry = match presets::glider() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("cannot build preset aircraft: {}", e);
            return;
        }
    };
    let conditions = vec![
        ("alpha".to_string(), vec![0.0, 4.0]),
        ("elevator".to_string(), vec![0.0, -2.0]),
    ];
    let parent = std::env::temp_dir().join("avl-bridge-dry-run");

    let outcome = run_series_with(&DryRun, &geometry, &conditions, 1_000.0, &AbortFlag::new(), &parent);
    println!("--- results: {}", outcome.results.len());
    if let Some(w) = outcome.warnings {
        println!("--- warnings:\n{}", w);
    }
}
