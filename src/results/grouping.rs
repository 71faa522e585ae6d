use super::lexer::{Coefficients, SPIRAL_KEY};

/// Keys that open a new block in a flat ST mapping: `Alpha` starts the
/// forces, `CLa` the derivatives.
pub const BLOCK_MARKERS: [&str; 2] = ["Alpha", "CLa"];

/// Fixed presentation order of a total-forces block.
pub const FORCE_GROUPS: &[(&str, &[&str])] = &[
    ("Flight condition", &["Alpha", "Beta", "Mach"]),
    ("Rates", &["pb/2V", "qc/2V", "rb/2V", "p'b/2V", "r'b/2V"]),
    ("Body forces", &["CXtot", "CYtot", "CZtot"]),
    ("Body moments", &["Cltot", "Cmtot", "Cntot"]),
    ("Stability moments", &["Cl'tot", "Cn'tot"]),
    ("Lift and drag", &["CLtot", "CDtot", "CDvis", "CDind"]),
    ("Trefftz plane", &["CLff", "CDff", "CYff", "e"]),
];

pub const LEFTOVER_GROUP: &str = "Other";
pub const MISC_GROUP: &str = "misc";

/// Named, ordered subset of a result block.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub values: Coefficients,
}

/// Cut a flat mapping each time a marker key appears. Whatever precedes the
/// first marker is the file header and is dropped.
pub fn split_into_blocks(flat: &Coefficients) -> Vec<Coefficients> {
    let mut blocks: Vec<Coefficients> = vec![Coefficients::new()];
    for (key, value) in flat.iter() {
        if BLOCK_MARKERS.contains(&key) {
            blocks.push(Coefficients::new());
        }
        if let Some(current) = blocks.last_mut() {
            current.push(key, value);
        }
    }
    blocks.remove(0);
    blocks
}

/// Reorder `block` by `groups`; keys in no group form a trailing
/// [`LEFTOVER_GROUP`]. Empty groups are left out.
pub fn sort_and_group(block: &Coefficients, groups: &[(&str, &[&str])]) -> Vec<Group> {
    let mut out = Vec::new();
    for (name, keys) in groups {
        let values: Coefficients = keys
            .iter()
            .filter_map(|k| block.get(k).map(|v| (k.to_string(), v)))
            .collect();
        if !values.is_empty() {
            out.push(Group { name: name.to_string(), values });
        }
    }

    let leftovers: Coefficients = block
        .iter()
        .filter(|(k, _)| !groups.iter().any(|(_, keys)| keys.contains(k)))
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    if !leftovers.is_empty() {
        out.push(Group { name: LEFTOVER_GROUP.to_string(), values: leftovers });
    }
    out
}

/// Axis a derivative is taken with respect to: the control suffix `d<n>`,
/// otherwise the last character (`a`, `b`, `p`, `q`, `r`).
fn derivative_suffix(key: &str) -> Option<&str> {
    let digits = key.len() - key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        let head = &key[..key.len() - digits];
        if head.ends_with('d') && head.len() > 1 {
            return Some(&key[head.len() - 1..]);
        }
        return None;
    }
    let last = key.char_indices().last()?.0;
    if last == 0 {
        return None;
    }
    Some(&key[last..])
}

fn suffix_order(suffix: &str) -> (u32, u32) {
    match suffix {
        "a" => (0, 0),
        "b" => (1, 0),
        "p" => (2, 0),
        "q" => (3, 0),
        "r" => (4, 0),
        d => (5, d.get(1..).and_then(|n| n.parse().ok()).unwrap_or(u32::MAX)),
    }
}

/// Group a derivatives block by axis suffix. `Xnp` and the spiral
/// stability ratio go to [`MISC_GROUP`], which comes last.
pub fn sort_and_group_derivatives(block: &Coefficients) -> Vec<Group> {
    let mut buckets: Vec<(String, Coefficients)> = Vec::new();
    let mut misc = Coefficients::new();

    for (key, value) in block.iter() {
        let suffix = if key == "Xnp" || key == SPIRAL_KEY {
            None
        } else {
            derivative_suffix(key)
        };
        let Some(suffix) = suffix else {
            misc.push(key, value);
            continue;
        };
        match buckets.iter_mut().find(|(s, _)| s == suffix) {
            Some((_, values)) => values.push(key, value),
            None => {
                let mut values = Coefficients::new();
                values.push(key, value);
                buckets.push((suffix.to_string(), values));
            }
        }
    }

    buckets.sort_by_key(|(s, _)| suffix_order(s));
    let mut out: Vec<Group> = buckets
        .into_iter()
        .map(|(name, values)| Group { name, values })
        .collect();
    if !misc.is_empty() {
        out.push(Group { name: MISC_GROUP.to_string(), values: misc });
    }
    out
}

/// Move control derivatives (`CLd1`, `Cmd2`, ...) out of a derivatives
/// block: the rest, then one block per control in index order.
pub fn split_control_derivatives(block: &Coefficients) -> (Coefficients, Vec<Coefficients>) {
    let mut rest = Coefficients::new();
    let mut controls: Vec<(u32, Coefficients)> = Vec::new();
    for (key, value) in block.iter() {
        let index = derivative_suffix(key)
            .filter(|s| s.starts_with('d'))
            .and_then(|s| s[1..].parse::<u32>().ok());
        let Some(n) = index else {
            rest.push(key, value);
            continue;
        };
        match controls.iter_mut().find(|(i, _)| *i == n) {
            Some((_, values)) => values.push(key, value),
            None => {
                let mut values = Coefficients::new();
                values.push(key, value);
                controls.push((n, values));
            }
        }
    }
    controls.sort_by_key(|(i, _)| *i);
    (rest, controls.into_iter().map(|(_, values)| values).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::lexer::parse_stability_file;

    fn coefficients(pairs: &[(&str, f64)]) -> Coefficients {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn blocks_split_on_markers_and_drop_header() {
        let flat = coefficients(&[
            ("Sref", 12.0),
            ("Cref", 1.2),
            ("Alpha", 2.0),
            ("CLtot", 0.4),
            ("CLa", 5.1),
            ("Cma", -0.8),
            ("Alpha", 4.0),
        ]);
        let blocks = split_into_blocks(&flat);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].keys().collect::<Vec<_>>(), ["Alpha", "CLtot"]);
        assert_eq!(blocks[1].get("Cma"), Some(-0.8));
        assert_eq!(blocks[2].get("Alpha"), Some(4.0));
    }

    #[test]
    fn forces_grouped_in_fixed_order() {
        let block = coefficients(&[
            ("CLtot", 0.4),
            ("Mach", 0.1),
            ("Alpha", 2.0),
            ("CDtot", 0.02),
            ("Custom", 7.0),
        ]);
        let groups = sort_and_group(&block, FORCE_GROUPS);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Flight condition", "Lift and drag", LEFTOVER_GROUP]);
        assert_eq!(groups[0].values.keys().collect::<Vec<_>>(), ["Alpha", "Mach"]);
        assert_eq!(groups[2].values.get("Custom"), Some(7.0));
    }

    #[test]
    fn control_derivatives_split_per_control() {
        let block = coefficients(&[
            ("CLa", 5.1),
            ("CLd2", 0.002),
            ("CLd1", 0.01),
            ("Cmd1", -0.03),
            ("Xnp", 0.3),
        ]);
        let (rest, controls) = split_control_derivatives(&block);
        assert_eq!(rest.keys().collect::<Vec<_>>(), ["CLa", "Xnp"]);
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].keys().collect::<Vec<_>>(), ["CLd1", "Cmd1"]);
        assert_eq!(controls[1].get("CLd2"), Some(0.002));
    }

    #[test]
    fn derivative_suffixes() {
        assert_eq!(derivative_suffix("CLa"), Some("a"));
        assert_eq!(derivative_suffix("Cnr"), Some("r"));
        assert_eq!(derivative_suffix("CLd2"), Some("d2"));
        assert_eq!(derivative_suffix("CDffd11"), Some("d11"));
        assert_eq!(derivative_suffix("ed1"), Some("d1"));
        assert_eq!(derivative_suffix("X"), None);
    }

    #[test]
    fn derivatives_bucketed_by_axis() {
        let text = "\
 CLa =   5.10   CLb =   0.00
 Cma =  -0.80   Cmb =   0.00
 CLp =   0.00   CLq =   7.20   CLr =   0.00
 CLd1 =  0.012  CLd2 =  0.000
 Cmd1 = -0.030  Cmd2 = -0.002
 Xnp =   0.312
 Clb Cnr / Clr Cnb  =   1.076";
        let groups = sort_and_group_derivatives(&parse_stability_file(text));
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "p", "q", "r", "d1", "d2", MISC_GROUP]);
        assert_eq!(groups[0].values.keys().collect::<Vec<_>>(), ["CLa", "Cma"]);
        assert_eq!(groups[5].values.keys().collect::<Vec<_>>(), ["CLd1", "Cmd1"]);
        assert_eq!(groups[7].values.keys().collect::<Vec<_>>(), ["Xnp", SPIRAL_KEY]);
    }
}
