/// Owner of the eligible portrait list.
///
/// The list is rebuilt from scratch after every catalog load and swapped in
/// whole; readers only get a shared slice, so the picker can never edit it.

use tracing::debug;

use crate::domain::catalog::PortraitCatalog;
use crate::domain::eligibility::{scan, EligibilityRules};
use crate::domain::portrait::EligibleEntry;

pub struct EligibleRegistry {
    rules: EligibilityRules,
    entries: Vec<EligibleEntry>,
    /// Bumped on every rebuild.
    generation: u64,
}

impl EligibleRegistry {
    pub fn new(rules: EligibilityRules) -> Self {
        EligibleRegistry {
            rules,
            entries: Vec::new(),
            generation: 0,
        }
    }

    /// Catalog finished loading: rescan and replace the list.
    pub fn rebuild(&mut self, catalog: &dyn PortraitCatalog) {
        self.entries = scan(catalog, &self.rules);
        self.generation += 1;
        debug!(target: "portraits", generation = self.generation, "eligible list replaced");
    }

    pub fn entries(&self) -> &[EligibleEntry] {
        &self.entries
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
