use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::abort::AbortFlag;
use super::process::{AvlProcess, Solver};
use super::script::{build_command_script, build_run_case_block, case_count, FlightConditions};
use super::workdir::WorkDir;
use crate::config::SolverConfig;
use crate::geometry::Geometry;
use crate::results::{extract_loading_issues, parse_case, CaseResult};

pub const ABORTED: &str = "Aborted";

const GEOMETRY_FILE: &str = "geometry.avl";
const RUN_FILE: &str = "geometry.run";

/// What a series produced. A series can yield results and warnings
/// together, or an error with no results. `results` holds one entry per
/// run case; a case without a result file is an empty [`CaseResult`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesOutcome {
    pub results: Vec<CaseResult>,
    pub error: Option<String>,
    pub warnings: Option<String>,
}

impl SeriesOutcome {
    fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    fn aborted() -> Self {
        Self::failed(ABORTED)
    }

    pub fn is_aborted(&self) -> bool {
        self.error.as_deref() == Some(ABORTED)
    }
}

// ---------------------------------------------------------------------------
// Series execution
// ---------------------------------------------------------------------------

/// Run every case of `conditions` through `solver` in a fresh `series_N`
/// directory under `app_working_dir`. The directory is gone when this
/// returns.
///
/// `abort` is checked before any file is written and again before the
/// solver starts; a flag set while the solver runs discards its output.
pub fn run_series_with(
    solver: &dyn Solver,
    geometry: &Geometry,
    conditions: &FlightConditions,
    altitude: f64,
    abort: &AbortFlag,
    app_working_dir: &Path,
) -> SeriesOutcome {
    if abort.is_set() {
        return SeriesOutcome::aborted();
    }

    let cases = match case_count(conditions) {
        Ok(n) => n,
        Err(e) => return SeriesOutcome::failed(e),
    };
    let run_cases = match build_run_case_block(conditions, altitude) {
        Ok(text) => text,
        Err(e) => return SeriesOutcome::failed(e),
    };
    log::info!("running {} cases of '{}' with {}", cases, geometry.name, solver.name());

    let dir = match WorkDir::create(app_working_dir) {
        Ok(dir) => dir,
        Err(e) => return SeriesOutcome::failed(format!("cannot create work directory: {}", e)),
    };
    let geometry_path = dir.join(GEOMETRY_FILE);
    if let Err(e) = geometry
        .save(&geometry_path)
        .and_then(|()| fs::write(dir.join(RUN_FILE), run_cases))
    {
        return SeriesOutcome::failed(format!("cannot write solver input: {}", e));
    }
    let outputs: Vec<PathBuf> = (1..=cases).map(|i| dir.join(format!("case_{}.st", i))).collect();

    if abort.is_set() {
        return SeriesOutcome::aborted();
    }

    let script = build_command_script(&outputs);
    let dump = match solver.execute(&script, &geometry_path, dir.path()) {
        Ok(dump) => dump,
        Err(e) => {
            log::warn!("{} failed: {}", solver.name(), e);
            return SeriesOutcome::failed(e);
        }
    };

    if abort.is_set() {
        return SeriesOutcome::aborted();
    }

    let (results, missing) = read_results(&outputs);
    let mut notes: Vec<String> = extract_loading_issues(&dump).into_iter().collect();
    if !missing.is_empty() {
        log::warn!("{} of {} cases produced no results", missing.len(), cases);
        notes.extend(
            missing
                .iter()
                .map(|path| format!("solver wrote no result file {}", path.display())),
        );
    }
    SeriesOutcome {
        results,
        error: None,
        warnings: if notes.is_empty() { None } else { Some(notes.join("\n")) },
    }
}

/// [`run_series_with`] on the configured AVL executable, inside
/// `config.working_dir`.
pub fn run_series(
    config: &SolverConfig,
    geometry: &Geometry,
    conditions: &FlightConditions,
    altitude: f64,
    abort: &AbortFlag,
) -> SeriesOutcome {
    let solver = AvlProcess::new(&config.executable);
    run_series_with(&solver, geometry, conditions, altitude, abort, &config.working_dir)
}

/// Parse every ST file, one result per case. A case whose file is missing
/// gets an empty result and its path is returned alongside.
fn read_results(outputs: &[PathBuf]) -> (Vec<CaseResult>, Vec<PathBuf>) {
    let mut missing = Vec::new();
    let results = outputs
        .iter()
        .map(|path| match fs::read_to_string(path) {
            Ok(text) => parse_case(&text),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    log::warn!("reading {}: {}", path.display(), e);
                }
                missing.push(path.clone());
                CaseResult::default()
            }
        })
        .collect();
    (results, missing)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
