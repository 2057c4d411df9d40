use std::sync::Arc;

use crate::unit::Unit;

/// Every unit fetched for the session, in backend order.
///
/// Cloning is cheap and never copies the records; nothing hands out mutable
/// access once the catalog is built.
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: Arc<[Unit]>,
}

impl UnitCatalog {
    #[must_use]
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units: units.into(),
        }
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of units that carry usable coordinates.
    #[must_use]
    pub fn mappable_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_mappable()).count()
    }
}

impl From<Vec<Unit>> for UnitCatalog {
    fn from(units: Vec<Unit>) -> Self {
        Self::new(units)
    }
}
