use crate::content::{normalize_label, MechanicTable};

const HAS_PREFIX: &str = "has";
const FIRE_ICE_BALLS: &str = "fireiceballs";
const FIRE_AND_ICE_BALLS: &str = "fireandiceballs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MechanicResolution {
    Resolved(String),
    /// Known mechanic with no logic key equivalent.
    Ignored,
    Unmapped,
}

/// Resolves one rule mechanic against the table. The checks run in a fixed order and the first
/// one that applies decides the outcome.
pub fn resolve_mechanic(table: &MechanicTable, mechanic: &str) -> MechanicResolution {
    let normalized = normalize_label(mechanic);

    if let Some(key) = table.get(&normalized) {
        return MechanicResolution::Resolved(key.to_string());
    }
    if let Some(key) = table.get(&format!("{HAS_PREFIX}{normalized}")) {
        return MechanicResolution::Resolved(key.to_string());
    }
    if is_irrelevant_mechanic(&normalized) {
        return MechanicResolution::Ignored;
    }
    if normalized == FIRE_ICE_BALLS {
        return match table.get(FIRE_AND_ICE_BALLS) {
            Some(key) => MechanicResolution::Resolved(key.to_string()),
            None => MechanicResolution::Ignored,
        };
    }
    MechanicResolution::Unmapped
}

// Gem counters, clutter variants and kevin blocks never gate a location.
fn is_irrelevant_mechanic(normalized: &str) -> bool {
    normalized.starts_with("gem") || normalized.ends_with("clutter") || normalized == "kevinblocks"
}
