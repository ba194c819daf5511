use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::content::{CanonicalLocationNames, LevelData, MechanicTable};

use super::resolver::{resolve_mechanic, MechanicResolution};

/// Canonical location name -> logic keys required to reach it, in level document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedRuleMap {
    entries: IndexMap<String, Vec<String>>,
}

impl DerivedRuleMap {
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(name, keys)| (name.as_str(), keys.as_slice()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnmappedMechanic {
    pub mechanic: String,
    pub location: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuditOutcome {
    pub rule_map: DerivedRuleMap,
    pub unmapped_mechanics: HashSet<UnmappedMechanic>,
}

/// Matches every tracked location in `levels` to its canonical name and resolves its rule.
///
/// Locations whose composed name is not canonical are skipped. When two locations compose the
/// same name the later one's keys replace the earlier ones.
pub fn build_rule_map(
    levels: &LevelData,
    names: &CanonicalLocationNames,
    table: &MechanicTable,
) -> AuditOutcome {
    let mut entries = IndexMap::<String, Vec<String>>::new();
    let mut unmapped_mechanics = HashSet::<UnmappedMechanic>::new();
    let mut ignored_count = 0usize;

    for (name, location) in levels.named_locations() {
        if !names.contains(&name) {
            continue;
        }

        let mut keys = Vec::new();
        for mechanic in location.required_mechanics() {
            match resolve_mechanic(table, mechanic) {
                MechanicResolution::Resolved(key) => keys.push(key),
                MechanicResolution::Ignored => ignored_count += 1,
                MechanicResolution::Unmapped => {
                    debug!(mechanic = %mechanic, location = %name, "mechanic_unmapped");
                    unmapped_mechanics.insert(UnmappedMechanic {
                        mechanic: mechanic.clone(),
                        location: name.clone(),
                    });
                }
            }
        }
        entries.insert(name, keys);
    }

    info!(
        mapped = entries.len(),
        canonical = names.distinct_len(),
        unmapped_mechanics = unmapped_mechanics.len(),
        ignored_mechanics = ignored_count,
        "rule_map_built"
    );

    AuditOutcome {
        rule_map: DerivedRuleMap { entries },
        unmapped_mechanics,
    }
}
