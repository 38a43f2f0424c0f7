//! Static catalog of selectable symptoms.

use serde::Serialize;

/// A selectable symptom category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymptomEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

static SYMPTOMS: &[SymptomEntry] = &[
    SymptomEntry {
        id: "anxiety",
        label: "Anxiety",
        description: "Feeling worried, nervous, or uneasy",
    },
    SymptomEntry {
        id: "depression",
        label: "Depression",
        description: "Persistent feelings of sadness or loss of interest",
    },
    SymptomEntry {
        id: "ptsd",
        label: "PTSD",
        description: "Difficulty recovering from traumatic experiences",
    },
    SymptomEntry {
        id: "stress",
        label: "Stress",
        description: "Feeling overwhelmed or under pressure",
    },
];

/// Read-only lookup over the built-in symptom table.
#[derive(Debug, Clone, Copy)]
pub struct SymptomCatalog {
    entries: &'static [SymptomEntry],
}

impl SymptomCatalog {
    /// The catalog shipped with the application.
    pub const fn builtin() -> Self {
        Self { entries: SYMPTOMS }
    }

    /// All entries, in display order.
    pub fn entries(&self) -> &'static [SymptomEntry] {
        self.entries
    }

    pub fn get(&self, id: &str) -> Option<&'static SymptomEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

impl Default for SymptomCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
