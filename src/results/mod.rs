//! Parsing of solver output: the stdout dump and per-case ST files.

pub mod dump;
pub mod grouping;
pub mod lexer;

pub use dump::{extract_loading_issues, split_on_equals_rule};
pub use grouping::{
    sort_and_group, sort_and_group_derivatives, split_control_derivatives, split_into_blocks, Group,
    FORCE_GROUPS,
};
pub use lexer::{parse_force_block, parse_stability_file, Coefficients};

/// Parsed ST file of one run case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseResult {
    pub forces: Coefficients,
    pub derivatives: Coefficients,
}

impl CaseResult {
    /// True for a case the solver wrote no results for.
    pub fn is_empty(&self) -> bool {
        self.forces.is_empty() && self.derivatives.is_empty()
    }

    pub fn grouped_forces(&self) -> Vec<Group> {
        sort_and_group(&self.forces, FORCE_GROUPS)
    }

    pub fn grouped_derivatives(&self) -> Vec<Group> {
        sort_and_group_derivatives(&self.derivatives)
    }

    /// Forces, stability derivatives, then one block per control.
    pub fn blocks(&self) -> Vec<Coefficients> {
        let (stability, controls) = split_control_derivatives(&self.derivatives);
        let mut out = vec![self.forces.clone(), stability];
        out.extend(controls);
        out
    }
}

/// Forces block followed by the derivatives block; a file cut short
/// yields empty blocks.
pub fn parse_case(st_text: &str) -> CaseResult {
    let mut blocks = split_into_blocks(&parse_stability_file(st_text)).into_iter();
    let forces = blocks.next().unwrap_or_default();
    let derivatives = blocks.next().unwrap_or_default();
    if blocks.next().is_some() {
        log::warn!("ST file has more than two result blocks; extra blocks ignored");
    }
    CaseResult { forces, derivatives }
}
