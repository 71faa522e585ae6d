use std::path::PathBuf;

use crate::error::SolverError;
use crate::physics::{atmosphere, G0};

/// Flight condition name (`alpha`, `beta`, `pb/2V`, a control name, ...)
/// with one value per run case.
pub type FlightConditions = [(String, Vec<f64>)];

/// Number of run cases described by `conditions`; every list must have the
/// same length.
pub fn case_count(conditions: &FlightConditions) -> Result<usize, SolverError> {
    let Some((_, first)) = conditions.first() else {
        return Ok(0);
    };
    let expected = first.len();
    match conditions.iter().find(|(_, values)| values.len() != expected) {
        Some((name, values)) => Err(SolverError::MismatchedConditions {
            name: name.clone(),
            expected,
            found: values.len(),
        }),
        None => Ok(expected),
    }
}

/// `.run` file text: one paragraph per case, each closed by the
/// gravity and density at `altitude` (m).
pub fn build_run_case_block(conditions: &FlightConditions, altitude: f64) -> Result<String, SolverError> {
    let cases = case_count(conditions)?;
    let density = atmosphere::density(altitude);

    let paragraphs: Vec<String> = (0..cases)
        .map(|i| {
            let n = i + 1;
            let mut out = format!("Run case  {}: AutoGenCase{}\n", n, n);
            for (name, values) in conditions {
                out.push_str(&format!("{} = {}\n", name, values[i]));
            }
            out.push_str(&format!("grav.acc. = {} m/s^2\n", G0));
            out.push_str(&format!("density = {} kg/m^3\n", density));
            out
        })
        .collect();
    Ok(paragraphs.join("\n"))
}

/// Keystrokes for the solver's OPER menu: write one ST file per case.
pub fn build_command_script(output_paths: &[PathBuf]) -> String {
    let mut out = String::from("OPER\n");
    for (i, path) in output_paths.iter().enumerate() {
        out.push_str(&format!("{}\nX\nst\n{}\n", i + 1, path.display()));
    }
    out.push_str("\nQ\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> Vec<(String, Vec<f64>)> {
        vec![
            ("alpha".to_string(), vec![0.0, 2.5]),
            ("beta".to_string(), vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn one_paragraph_per_case() {
        let text = build_run_case_block(&sweep(), 0.0).unwrap();
        let paragraphs: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs[0].starts_with("Run case  1: AutoGenCase1\nalpha = 0\nbeta = 0\n"));
        assert!(paragraphs[1].starts_with("Run case  2: AutoGenCase2\nalpha = 2.5\nbeta = 1\n"));
        for p in paragraphs {
            assert!(p.contains("grav.acc. = 9.80665 m/s^2"));
            assert!(p.contains("density = 1.22"));
        }
    }

    #[test]
    fn density_follows_altitude() {
        let sea = build_run_case_block(&sweep(), 0.0).unwrap();
        let high = build_run_case_block(&sweep(), 5_000.0).unwrap();
        assert_ne!(sea, high);
        assert!(high.contains(&format!("density = {} kg/m^3", atmosphere::density(5_000.0))));
    }

    #[test]
    fn mismatched_lists_rejected() {
        let mut conditions = sweep();
        conditions[1].1.push(3.0);
        let err = build_run_case_block(&conditions, 0.0).unwrap_err();
        assert!(matches!(
            err,
            SolverError::MismatchedConditions { ref name, expected: 2, found: 3 } if name == "beta"
        ));
        assert_eq!(build_run_case_block(&[], 0.0).unwrap(), "");
    }

    #[test]
    fn command_script_layout() {
        let paths = vec![PathBuf::from("/tmp/run/case_1.st"), PathBuf::from("/tmp/run/case_2.st")];
        assert_eq!(
            build_command_script(&paths),
            "OPER\n1\nX\nst\n/tmp/run/case_1.st\n2\nX\nst\n/tmp/run/case_2.st\n\nQ\n"
        );
    }
}
