use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::SolverError;

/// Something that can run a command script against a geometry file.
///
/// Implement this to drive a different solver build or to stand in for
/// the real executable in tests.
pub trait Solver {
    /// Run `script` with `geometry_file` loaded, inside `working_dir`.
    /// Returns the stdout transcript.
    fn execute(&self, script: &str, geometry_file: &Path, working_dir: &Path) -> Result<String, SolverError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "solver"
    }
}

/// The external AVL executable.
#[derive(Debug, Clone)]
pub struct AvlProcess {
    pub executable: PathBuf,
}

impl AvlProcess {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self { executable: executable.into() }
    }
}

impl Solver for AvlProcess {
    fn execute(&self, script: &str, geometry_file: &Path, working_dir: &Path) -> Result<String, SolverError> {
        log::debug!("launching {} on {}", self.executable.display(), geometry_file.display());
        let mut child = Command::new(&self.executable)
            .arg(geometry_file)
            .current_dir(working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::Spawn {
                path: self.executable.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(script.as_bytes())?;
        }
        let output = child.wait_with_output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        classify_output(&stdout, &stderr)?;
        Ok(stdout)
    }

    fn name(&self) -> &str {
        "avl"
    }
}

/// Turn solver complaints into errors.
///
/// Stderr lines mentioning "Note" are informational. On stdout, SDUPL on
/// any line is a duplicate-resolution error and `***` marks an error;
/// SINVRT (singular matrix) is only logged.
pub fn classify_output(stdout: &str, stderr: &str) -> Result<(), SolverError> {
    let complaints: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.contains("Note"))
        .collect();
    if !complaints.is_empty() {
        return Err(SolverError::Stderr(complaints.join("\n")));
    }

    let mut fatal = Vec::new();
    for line in stdout.lines().map(str::trim) {
        if line.contains("SDUPL") {
            return Err(SolverError::DuplicateResolution(line.to_string()));
        } else if line.contains("SINVRT") {
            log::warn!("solver: {}", line);
        } else if line.contains("***") {
            fatal.push(line);
        }
    }
    if fatal.is_empty() {
        Ok(())
    } else {
        Err(SolverError::Fatal(fatal.join("\n")))
    }
}
