use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The change record consumed from the external change detector.
/// All fields default to empty so a partially populated file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(default)]
    pub changed_files: Vec<String>,
    #[serde(default)]
    pub affected_functions: Vec<String>,
    #[serde(default)]
    pub affected_classes: Vec<String>,
    #[serde(default)]
    pub affected_methods: Vec<String>,
}

impl ChangeSet {
    /// Deduplicated union of all affected component ids. Order-irrelevant
    /// per the change-detector contract, so a sorted set is returned.
    pub fn components(&self) -> BTreeSet<String> {
        self.affected_functions
            .iter()
            .chain(self.affected_classes.iter())
            .chain(self.affected_methods.iter())
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.changed_files.is_empty()
            && self.affected_functions.is_empty()
            && self.affected_classes.is_empty()
            && self.affected_methods.is_empty()
    }

    /// Stable digest of the changeset, used as the cache key for stored
    /// review runs. Not cryptographic; collisions only cost a cache miss.
    pub fn digest(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        let mut files = self.changed_files.clone();
        files.sort();
        files.hash(&mut hasher);
        self.components().hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}
