//! The pure (catalog, criteria) → visible-list step.
//!
//! Each predicate is total: absent fields simply fail to match. The four
//! predicates are a conjunction and are independent of one another, so the
//! evaluation order below is only a matter of cost.

use crate::catalog::UnitCatalog;
use crate::criteria::{FilterCriteria, SortMode};
use crate::normalize::{collate, normalize};
use crate::unit::Unit;

/// Returns the visible units in display order, borrowing from the catalog.
///
/// An empty network selection yields an empty list regardless of the other
/// criteria.
#[must_use]
pub fn filter_units<'a>(catalog: &'a UnitCatalog, criteria: &FilterCriteria) -> Vec<&'a Unit> {
    if criteria.selected_networks.is_empty() {
        return Vec::new();
    }

    let state = criteria.state_filter().map(StateMatcher::new);
    let tax_id = criteria.tax_id_filter();
    let name = criteria.name_filter().map(|n| normalize(Some(n)));

    let mut visible: Vec<&Unit> = catalog
        .units()
        .iter()
        .filter(|u| matches_network(u, criteria))
        .filter(|u| state.as_ref().is_none_or(|m| m.matches(u)))
        .filter(|u| tax_id.is_none_or(|t| matches_tax_id(u, t)))
        .filter(|u| name.as_deref().is_none_or(|n| matches_name(u, n)))
        .collect();

    sort_units(&mut visible, criteria.sort_mode);
    visible
}

/// Owned variant of [`filter_units`].
#[must_use]
pub fn filter_units_owned(catalog: &UnitCatalog, criteria: &FilterCriteria) -> Vec<Unit> {
    filter_units(catalog, criteria)
        .into_iter()
        .cloned()
        .collect()
}

fn matches_network(unit: &Unit, criteria: &FilterCriteria) -> bool {
    unit.network
        .as_deref()
        .is_some_and(|n| criteria.selected_networks.contains(n))
}

/// Matches either the explicit state field or an address ending in `-UF`.
struct StateMatcher {
    target: String,
    address_suffix: String,
}

impl StateMatcher {
    fn new(state: &str) -> Self {
        let target = normalize(Some(state));
        let address_suffix = format!("-{target}");
        Self {
            target,
            address_suffix,
        }
    }

    fn matches(&self, unit: &Unit) -> bool {
        let by_field = unit.state.is_some() && normalize(unit.state.as_deref()) == self.target;
        let by_address = unit.original_address.is_some()
            && normalize(unit.original_address.as_deref()).contains(&self.address_suffix);
        by_field || by_address
    }
}

// Case-sensitive on purpose: tax IDs are compared verbatim, names are not.
fn matches_tax_id(unit: &Unit, needle: &str) -> bool {
    unit.tax_id.as_deref().is_some_and(|t| t.contains(needle))
}

fn matches_name(unit: &Unit, normalized_needle: &str) -> bool {
    unit.name.is_some() && normalize(unit.name.as_deref()).contains(normalized_needle)
}

/// Stable sort; an absent key sorts as the empty string. Descending order
/// flips the comparator rather than reversing the output so ties keep
/// catalog order in both directions.
fn sort_units(units: &mut [&Unit], mode: SortMode) {
    fn key(unit: &Unit, mode: SortMode) -> &str {
        match mode {
            SortMode::NameAsc | SortMode::NameDesc => unit.name.as_deref(),
            SortMode::NetworkAsc | SortMode::NetworkDesc => unit.network.as_deref(),
        }
        .unwrap_or("")
    }

    let descending = matches!(mode, SortMode::NameDesc | SortMode::NetworkDesc);
    units.sort_by(|a, b| {
        let ord = collate(key(a, mode), key(b, mode));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
