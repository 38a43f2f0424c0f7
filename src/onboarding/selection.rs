//! Symptom selection with set-toggle semantics over catalog ids.

use std::collections::BTreeSet;

use tracing::warn;

use super::catalog::SymptomCatalog;

/// The symptom ids the user currently has toggled on.
///
/// Only ids present in the catalog are ever stored.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    catalog: SymptomCatalog,
    selected: BTreeSet<&'static str>,
}

impl SelectionSet {
    pub fn new(catalog: SymptomCatalog) -> Self {
        Self {
            catalog,
            selected: BTreeSet::new(),
        }
    }

    /// Flip membership of `id`. Returns whether it is selected afterwards.
    ///
    /// Ids outside the catalog are ignored and reported as not selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        let Some(entry) = self.catalog.get(id) else {
            warn!(symptom_id = %id, "Ignoring toggle of unknown symptom");
            return false;
        };
        if self.selected.remove(entry.id) {
            false
        } else {
            self.selected.insert(entry.id);
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Owned copy of the selected ids, in catalog order.
    pub fn snapshot(&self) -> Vec<String> {
        self.catalog
            .entries()
            .iter()
            .filter(|e| self.selected.contains(e.id))
            .map(|e| e.id.to_string())
            .collect()
    }
}
