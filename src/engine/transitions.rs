//! Label arithmetic for transitions.
//!
//! Stage labels are matched exactly, as configured. Labels named by users in
//! `add label` / `remove label` are matched ignoring ASCII case and resolved
//! to the spelling GitHub already uses.

use crate::types::LabelSet;

/// The labels after removing `strip` and then appending `add`.
///
/// The result has no duplicates and keeps the current order for labels that
/// stay. A label in both `strip` and `add` ends up present, at the end.
pub fn next_labels(current: &LabelSet, strip: &[String], add: &[String]) -> Vec<String> {
    let mut labels: LabelSet = current
        .iter()
        .filter(|label| !strip.iter().any(|stripped| stripped == label))
        .collect();
    for label in add {
        labels.insert(label.as_str());
    }
    labels.to_vec()
}

/// Splits requested labels into those the repository defines (in the
/// repository's spelling) and the rest (as requested). Both lists are free of
/// duplicates.
pub fn partition_known(requested: &[String], repository: &[String]) -> (Vec<String>, Vec<String>) {
    let mut known = LabelSet::new();
    let mut unknown = LabelSet::new();
    for name in requested {
        match repository
            .iter()
            .find(|label| label.eq_ignore_ascii_case(name))
        {
            Some(label) => known.insert(label.as_str()),
            None => unknown.insert(name.as_str()),
        };
    }
    (known.to_vec(), unknown.to_vec())
}

/// Splits requested labels into those on the issue (in the issue's spelling)
/// and the rest (as requested).
pub fn partition_present(requested: &[String], issue: &LabelSet) -> (Vec<String>, Vec<String>) {
    let mut present = LabelSet::new();
    let mut absent = LabelSet::new();
    for name in requested {
        match issue.find_ignore_case(name) {
            Some(label) => present.insert(label),
            None => absent.insert(name.as_str()),
        };
    }
    (present.to_vec(), absent.to_vec())
}
