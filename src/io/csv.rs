use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::results::CaseResult;

/// Write the force coefficients of a series to CSV, one row per run case.
///
/// Columns: case, then the force keys of the first case with results, in
/// solver order. A key missing from another case leaves its cell empty.
pub fn write_series<W: Write>(writer: &mut W, results: &[CaseResult]) -> io::Result<()> {
    let columns: Vec<&str> = results
        .iter()
        .find(|r| !r.forces.is_empty())
        .map(|r| r.forces.keys().collect())
        .unwrap_or_default();

    write!(writer, "case")?;
    for c in &columns {
        write!(writer, ",{}", c)?;
    }
    writeln!(writer)?;

    for (i, case) in results.iter().enumerate() {
        write!(writer, "{}", i + 1)?;
        for c in &columns {
            match case.forces.get(c) {
                Some(v) => write!(writer, ",{:.6}", v)?,
                None => write!(writer, ",")?,
            }
        }
        writeln!(writer)?;
    }

    Ok(())
}

pub fn write_series_file<P: AsRef<Path>>(path: P, results: &[CaseResult]) -> io::Result<()> {
    let mut file = File::create(path)?;
    write_series(&mut file, results)
}
