use crate::model::Level;
use std::collections::{BTreeSet, HashSet};

/// Level names present in both the host and the linked document
///
/// Exact, case-sensitive name equality. The result is ordered so reports are
/// stable, and does not depend on the order of either input.
#[must_use]
pub fn matching_levels(host_levels: &[Level], linked_levels: &[Level]) -> BTreeSet<String> {
    let host: HashSet<&str> = host_levels.iter().map(|l| l.name.as_str()).collect();

    linked_levels
        .iter()
        .filter(|l| host.contains(l.name.as_str()))
        .map(|l| l.name.clone())
        .collect()
}
