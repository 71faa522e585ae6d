use std::path::PathBuf;

use thiserror::Error;

/// Result type for geometry construction and editing.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Result type for reading `.avl` text.
pub type ParseResult<T> = Result<T, ParseError>;

// ---------------------------------------------------------------------------
// Geometry validation
// ---------------------------------------------------------------------------

/// Invariant violations raised while building or editing the geometry model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid NACA code '{0}': expected exactly 4 digits")]
    InvalidCode(String),

    #[error("invalid chord {0}: must be finite and not negative")]
    InvalidChord(f64),

    #[error("surface '{surface}' has a non-positive root chord ({chord})")]
    NonPositiveChord { surface: String, chord: f64 },

    #[error("hinge position {x_hinge} outside of {domain}")]
    HingeOutOfRange { x_hinge: f64, domain: &'static str },

    #[error("surface '{surface}' needs at least 2 sections, got {count}")]
    InsufficientSections { surface: String, count: usize },

    #[error("surface '{surface}' has two sections at spanwise position {position}")]
    DuplicateSpanwise { surface: String, position: f64 },

    #[error("spanwise position {position} outside of [{min}, {max}]")]
    OutOfRange { position: f64, min: f64, max: f64 },

    #[error("mechanization for {0} is already configured")]
    AlreadyConfigured(String),

    #[error("section at spanwise position {position} already carries control '{existing}'")]
    SectionAlreadyControlled { position: f64, existing: String },

    #[error("a surface named '{0}' already exists")]
    DuplicateName(String),

    #[error("no surface named '{0}'")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// .avl text parsing
// ---------------------------------------------------------------------------

/// Structural failures while reading `.avl` text. Recoverable oddities
/// (unsupported keywords, BODY blocks) are logged instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("line {line}: expected {expected}, found '{found}'")]
    Malformed {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Solver execution
// ---------------------------------------------------------------------------

/// Failures surfaced while preparing or running the external solver.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to launch solver '{path}': {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("solver i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("solver reported on stderr:\n{0}")]
    Stderr(String),

    #[error("solver reported a fatal error:\n{0}")]
    Fatal(String),

    #[error("duplicate-geometry resolution too fine (SDUPL):\n{0}")]
    DuplicateResolution(String),

    #[error("flight condition '{name}' has {found} values, expected {expected}")]
    MismatchedConditions {
        name: String,
        expected: usize,
        found: usize,
    },
}
