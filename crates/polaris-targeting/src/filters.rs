//! # Assignment Filter Catalog
//!
//! Lookup table of filter id → filter definition, loaded once per run from
//! the backend's filter list. Read-only reference data shared by all
//! concurrent evaluations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use polaris_core::FilterId;

use crate::model::AssignmentFilter;

/// Immutable filter-id → definition lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentFilterCatalog {
    filters: HashMap<FilterId, AssignmentFilter>,
}

impl AssignmentFilterCatalog {
    /// Build the catalog from fetched filter definitions.
    pub fn from_filters(filters: impl IntoIterator<Item = AssignmentFilter>) -> Self {
        Self {
            filters: filters.into_iter().map(|f| (f.id.clone(), f)).collect(),
        }
    }

    /// Resolve a filter id to its definition.
    pub fn get(&self, filter_id: &FilterId) -> Option<&AssignmentFilter> {
        self.filters.get(filter_id)
    }

    /// Number of filters in the catalog.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the catalog holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Platform;

    fn filter(id: &str, name: &str) -> AssignmentFilter {
        AssignmentFilter {
            id: FilterId::new(id).unwrap(),
            display_name: name.to_string(),
            platform: Platform::Windows,
            rule: "(device.model -eq \"Surface\")".to_string(),
        }
    }

    #[test]
    fn lookup_by_id() {
        let catalog = AssignmentFilterCatalog::from_filters([filter("f1", "Corporate Surfaces")]);
        let found = catalog.get(&FilterId::new("f1").unwrap()).unwrap();
        assert_eq!(found.display_name, "Corporate Surfaces");
        assert!(catalog.get(&FilterId::new("f2").unwrap()).is_none());
    }

    #[test]
    fn empty_catalog_resolves_nothing() {
        let catalog = AssignmentFilterCatalog::default();
        assert!(catalog.is_empty());
        assert!(catalog.get(&FilterId::new("f1").unwrap()).is_none());
    }
}
