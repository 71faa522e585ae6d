//! Solver stdout transcript ("dump") handling.

use std::sync::OnceLock;

use regex::Regex;

fn equals_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*={3,}[ \t]*\r?$").expect("valid regex"))
}

fn dash_rule() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-{5,}").expect("valid regex"))
}

/// Split on lines made only of `=`. Empty pieces are kept so block indices
/// match the transcript layout.
pub fn split_on_equals_rule(dump: &str) -> Vec<String> {
    equals_rule()
        .split(dump)
        .map(|b| b.trim_matches(['\r', '\n']).to_string())
        .collect()
}

/// Lines of the geometry-loading sub-block that the solver flagged with `*`.
///
/// Loading messages sit in the third `=` block, ahead of the mass and run
/// data sub-blocks (separated by dash runs).
pub fn extract_loading_issues(dump: &str) -> Option<String> {
    let blocks = split_on_equals_rule(dump);
    let loading = blocks.get(2)?;
    let geometry = dash_rule().split(loading).next().unwrap_or("");
    let flagged: Vec<&str> = geometry
        .lines()
        .filter(|l| l.contains('*'))
        .map(str::trim)
        .collect();
    if flagged.is_empty() {
        None
    } else {
        Some(flagged.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        assert!(equals_rule().is_match(" =====\n"));
        assert!(dash_rule().is_match("  -----------"));
    }

    const DUMP: &str = "\
 ===================================================
  Athena Vortex Lattice  Program      Version  3.40
 ===================================================

 Reading file: geometry.avl  ...
 Building surface: Wing
   Reflecting surface: Wing
 ** Warning: Section 2 chord is zero
 Building surface: Fin
  *** Trailing edge kink detected
 ---------------------------------------------------
 Mass file  geometry.mass  open error
  *** Using default mass
 ---------------------------------------------------
 Run cases read  ...    3
 ===================================================
 OPER
";

    #[test]
    fn blocks_follow_rules() {
        let blocks = split_on_equals_rule(DUMP);
        assert_eq!(blocks.len(), 4);
        assert!(blocks[0].trim().is_empty());
        assert!(blocks[1].contains("Athena"));
        assert!(blocks[2].starts_with("\n Reading file") || blocks[2].contains("Reading file"));
        assert!(blocks[3].contains("OPER"));
    }

    #[test]
    fn loading_issues_come_from_geometry_part() {
        let issues = extract_loading_issues(DUMP).unwrap();
        assert_eq!(
            issues,
            "** Warning: Section 2 chord is zero\n*** Trailing edge kink detected"
        );
    }

    #[test]
    fn clean_dump_has_no_issues() {
        let clean = "===\nbanner\n===\nReading file\nBuilding surface: Wing\n---------\nmass\n===\n";
        assert_eq!(extract_loading_issues(clean), None);
        assert_eq!(extract_loading_issues("no rules at all"), None);
    }
}
