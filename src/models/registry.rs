use crate::models::OperatorEntry;
use std::collections::HashMap;
use tracing::warn;

/// The operator registry for one run, deduplicated by registration id.
///
/// Built once and never mutated afterwards. Entries keep their source order.
/// The tax-id index covers every source row, including rows skipped as
/// registration-id duplicates.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    entries: Vec<OperatorEntry>,
    by_registration: HashMap<u32, usize>,
    by_tax_id: HashMap<String, OperatorEntry>,
    duplicates_skipped: usize,
}

impl OperatorRegistry {
    /// Build from entries in source order. The first occurrence of a registration id wins.
    pub fn from_entries(entries: impl IntoIterator<Item = OperatorEntry>) -> Self {
        let mut registry = Self::default();

        for entry in entries {
            if !registry.by_tax_id.contains_key(&entry.tax_id) {
                registry.by_tax_id.insert(entry.tax_id.clone(), entry.clone());
            }

            if registry.by_registration.contains_key(&entry.registration_id) {
                warn!(
                    registration_id = entry.registration_id,
                    "Duplicate registration id in registry, keeping first occurrence"
                );
                registry.duplicates_skipped += 1;
                continue;
            }

            let index = registry.entries.len();
            registry.by_registration.insert(entry.registration_id, index);
            registry.entries.push(entry);
        }

        registry
    }

    pub fn get(&self, registration_id: u32) -> Option<&OperatorEntry> {
        self.by_registration
            .get(&registration_id)
            .map(|&i| &self.entries[i])
    }

    /// First registry row carrying this tax id, in source order.
    pub fn find_by_tax_id(&self, tax_id: &str) -> Option<&OperatorEntry> {
        self.by_tax_id.get(tax_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates_skipped(&self) -> usize {
        self.duplicates_skipped
    }

    /// Derive the id-keyed maps the consolidator joins against.
    pub fn lookup(&self) -> OperatorLookup {
        let mut tax_ids = HashMap::with_capacity(self.entries.len());
        let mut legal_names = HashMap::with_capacity(self.entries.len());

        for entry in &self.entries {
            tax_ids.insert(entry.registration_id, entry.tax_id.clone());
            legal_names.insert(entry.registration_id, entry.legal_name.clone());
        }

        OperatorLookup {
            tax_ids,
            legal_names,
        }
    }
}

/// Read-only registration id → tax id / legal name maps.
#[derive(Debug, Clone, Default)]
pub struct OperatorLookup {
    tax_ids: HashMap<u32, String>,
    legal_names: HashMap<u32, String>,
}

impl OperatorLookup {
    pub fn from_maps(tax_ids: HashMap<u32, String>, legal_names: HashMap<u32, String>) -> Self {
        Self {
            tax_ids,
            legal_names,
        }
    }

    pub fn tax_id(&self, registration_id: u32) -> Option<&str> {
        self.tax_ids.get(&registration_id).map(String::as_str)
    }

    pub fn legal_name(&self, registration_id: u32) -> Option<&str> {
        self.legal_names.get(&registration_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tax_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tax_ids.is_empty()
    }
}
