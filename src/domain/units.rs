//! Unit table lookups.

use std::collections::HashMap;

use crate::domain::entities::Unit;

/// Flat lookup from unit identifier to abbreviation and category.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: HashMap<String, Unit>,
}

impl UnitRegistry {
    /// Later entries win when an id repeats.
    pub fn new(units: impl IntoIterator<Item = Unit>) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    /// Display abbreviation, or the identifier itself when unknown.
    pub fn abbreviate(&self, unit_id: &str) -> String {
        self.units
            .get(unit_id)
            .map(|u| u.abbreviation.clone())
            .unwrap_or_else(|| unit_id.to_string())
    }

    pub fn category(&self, unit_id: &str) -> Option<&str> {
        self.units.get(unit_id).and_then(|u| u.category.as_deref())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
