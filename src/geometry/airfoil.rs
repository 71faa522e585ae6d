use std::fs;
use std::path::Path;

use crate::error::{GeometryError, GeometryResult, ParseError, ParseResult};

/// Chordwise fraction range used by the solver when none is given.
pub const FULL_CHORD: (f64, f64) = (0.0, 1.0);

// ---------------------------------------------------------------------------
// Airfoil: cross-section shape of a lifting surface
// ---------------------------------------------------------------------------

/// 2D section shape. Built once, then shared read-only between sections.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Airfoil {
    /// Coordinate loop: upper surface trailing→leading edge, then lower
    /// surface leading→trailing edge.
    PointCloud {
        points: Vec<(f64, f64)>,
        active_range: (f64, f64),
    },
    /// NACA 4-digit series.
    Parametric {
        code: String,
        active_range: (f64, f64),
    },
    /// No shape: the solver falls back to a flat plate.
    #[default]
    Empty,
}

impl Airfoil {
    /// Tolerant parse of `x y` lines (whitespace, tab or comma separated).
    ///
    /// Lines that are not exactly two numbers in [-1, 1] are dropped, so
    /// header lines and stray text never fail the load.
    pub fn from_points<'a, I>(raw_lines: I) -> Airfoil
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut upper = Vec::new();
        let mut lower = Vec::new();
        let mut dropped = 0usize;

        for line in raw_lines {
            match parse_point(line) {
                Some((x, y)) if y >= 0.0 => upper.push((x, y)),
                Some(p) => lower.push(p),
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            log::debug!("airfoil: dropped {} non-coordinate lines", dropped);
        }
        if upper.is_empty() && lower.is_empty() {
            log::warn!("airfoil: no usable coordinates, using empty airfoil");
            return Airfoil::Empty;
        }

        upper.sort_by(|a, b| b.0.total_cmp(&a.0));
        lower.sort_by(|a, b| a.0.total_cmp(&b.0));
        upper.extend(lower);

        Airfoil::PointCloud {
            points: upper,
            active_range: FULL_CHORD,
        }
    }

    /// Load a coordinate file (Selig or Lednicer style, name line allowed).
    pub fn from_file<P: AsRef<Path>>(path: P) -> ParseResult<Airfoil> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Airfoil::from_points(text.lines()))
    }

    /// NACA 4-digit airfoil, e.g. `"2412"`.
    pub fn from_code(code: &str) -> GeometryResult<Airfoil> {
        let code = code.trim();
        if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(GeometryError::InvalidCode(code.to_string()));
        }
        Ok(Airfoil::Parametric {
            code: code.to_string(),
            active_range: FULL_CHORD,
        })
    }

    /// Same shape restricted to a chordwise range.
    pub fn with_active_range(self, range: (f64, f64)) -> Airfoil {
        match self {
            Airfoil::PointCloud { points, .. } => Airfoil::PointCloud {
                points,
                active_range: range,
            },
            Airfoil::Parametric { code, .. } => Airfoil::Parametric {
                code,
                active_range: range,
            },
            Airfoil::Empty => Airfoil::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Airfoil::Empty)
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Airfoil::PointCloud { points, .. } => format!("{} points", points.len()),
            Airfoil::Parametric { code, .. } => format!("NACA {}", code),
            Airfoil::Empty => "flat plate".to_string(),
        }
    }

    /// Airfoil sub-block of a SECTION.
    pub fn serialize(&self) -> String {
        match self {
            Airfoil::Parametric { code, active_range } => {
                format!("NACA {} {}\n{}\n", active_range.0, active_range.1, code)
            }
            Airfoil::PointCloud {
                points,
                active_range,
            } => {
                let mut out = format!("AIRFOIL {} {}\n", active_range.0, active_range.1);
                for (x, y) in points {
                    out.push_str(&format!("{} {}\n", x, y));
                }
                out
            }
            Airfoil::Empty => {
                log::warn!("serializing an empty airfoil; the solver will use a flat plate");
                String::new()
            }
        }
    }
}

/// One `x y` pair, or None for anything else.
fn parse_point(line: &str) -> Option<(f64, f64)> {
    let tokens: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() != 2 {
        return None;
    }
    let x: f64 = tokens[0].parse().ok()?;
    let y: f64 = tokens[1].parse().ok()?;
    if x.abs() > 1.0 || y.abs() > 1.0 {
        return None;
    }
    Some((x, y))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
