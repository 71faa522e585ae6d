use std::env;
use std::path::PathBuf;

use crate::geometry::Paneling;

/// Solver executable and per-run settings injected into the solver driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub executable: PathBuf,
    pub working_dir: PathBuf,         // parent of the per-run series_N directories
    pub chordwise_panels: u32,
    pub chord_spacing: f64,
    pub classification_tolerance: f64, // relative to the root chord
}

impl Default for SolverConfig {
    fn default() -> Self {
        let paneling = Paneling::default();
        Self {
            executable: PathBuf::from("avl"),
            working_dir: env::temp_dir().join("avl-bridge"),
            chordwise_panels: paneling.chordwise,
            chord_spacing: paneling.chord_spacing,
            classification_tolerance: 0.05,
        }
    }
}

impl SolverConfig {
    /// Defaults, overridden by `AVL_EXECUTABLE` and `AVL_WORKDIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(exe) = env::var_os("AVL_EXECUTABLE").filter(|v| !v.is_empty()) {
            config.executable = PathBuf::from(exe);
        }
        if let Some(dir) = env::var_os("AVL_WORKDIR").filter(|v| !v.is_empty()) {
            config.working_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn paneling(&self) -> Paneling {
        Paneling {
            chordwise: self.chordwise_panels,
            chord_spacing: self.chord_spacing,
        }
    }
}
