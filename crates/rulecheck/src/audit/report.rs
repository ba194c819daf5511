use std::collections::BTreeSet;
use std::io::{self, Write};

use crate::content::CanonicalLocationNames;

use super::rule_map::{AuditOutcome, DerivedRuleMap};

const SIDE_B_MARKER: &str = " B - ";
const SIDE_C_MARKER: &str = " C - ";
const SIDE_A_MARKER: &str = " A - ";
const FRONT_DOOR_KEY: &str = "hasFrontDoorKey";
const ENTRANCE_KEY: &str = "hasEntranceKey";
const NO_KEYS_PLACEHOLDER: &str = "<none>";
const REQUIREMENT_SAMPLE_LEN: usize = 5;
const UNMAPPED_SAMPLE_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditSummary {
    pub mapped: usize,
    pub canonical: usize,
    pub with_requirements: usize,
    pub unmapped_locations: usize,
    pub unmapped_mechanics: usize,
}

/// Canonical names with no rule map entry, in list order, repeats included.
pub fn unmapped_locations<'a>(
    outcome: &AuditOutcome,
    names: &'a CanonicalLocationNames,
) -> Vec<&'a str> {
    names
        .ordered()
        .iter()
        .map(String::as_str)
        .filter(|name| !outcome.rule_map.contains(name))
        .collect()
}

/// B/C side names that are canonical, unmapped, and have a mapped A side, with the A side keys.
pub fn inheritable_side_rules<'a>(
    rule_map: &'a DerivedRuleMap,
    names: &CanonicalLocationNames,
) -> Vec<(String, &'a str, &'a [String])> {
    let mut inheritable = Vec::new();
    for (a_side, keys) in rule_map.iter() {
        if !a_side.contains(SIDE_A_MARKER) {
            continue;
        }
        for marker in [SIDE_B_MARKER, SIDE_C_MARKER] {
            let other = a_side.replacen(SIDE_A_MARKER, marker, 1);
            if names.contains(&other) && !rule_map.contains(&other) {
                inheritable.push((other, a_side, keys));
            }
        }
    }
    inheritable
}

pub fn summarize(outcome: &AuditOutcome, names: &CanonicalLocationNames) -> AuditSummary {
    AuditSummary {
        mapped: outcome.rule_map.len(),
        canonical: names.distinct_len(),
        with_requirements: outcome
            .rule_map
            .iter()
            .filter(|(_, keys)| !keys.is_empty())
            .count(),
        unmapped_locations: unmapped_locations(outcome, names).len(),
        unmapped_mechanics: outcome.unmapped_mechanics.len(),
    }
}

pub fn write_report<W: Write>(
    outcome: &AuditOutcome,
    names: &CanonicalLocationNames,
    out: &mut W,
) -> io::Result<AuditSummary> {
    let rule_map = &outcome.rule_map;

    writeln!(out, "B/C side requirements:")?;
    for (name, keys) in rule_map.iter() {
        if name.contains(SIDE_B_MARKER) || name.contains(SIDE_C_MARKER) {
            if keys.is_empty() {
                writeln!(out, "{name} => {NO_KEYS_PLACEHOLDER}")?;
            } else {
                writeln!(out, "{name} => {keys:?}")?;
            }
        }
    }

    let summary = summarize(outcome, names);
    writeln!(out)?;
    writeln!(out, "mapped {} of {}", summary.mapped, summary.canonical)?;

    let with_requirements = rule_map
        .iter()
        .filter(|(_, keys)| !keys.is_empty())
        .map(|(name, _)| name)
        .take(REQUIREMENT_SAMPLE_LEN)
        .collect::<Vec<_>>();
    writeln!(out, "with requirements {}", summary.with_requirements)?;
    writeln!(out, "example entries {with_requirements:?}")?;

    let missing = unmapped_locations(outcome, names);
    writeln!(out, "unmapped location count {}", missing.len())?;
    writeln!(
        out,
        "sample unmapped {:?}",
        &missing[..missing.len().min(UNMAPPED_SAMPLE_LEN)]
    )?;

    let mechanic_sample = outcome
        .unmapped_mechanics
        .iter()
        .take(UNMAPPED_SAMPLE_LEN)
        .map(|entry| (entry.mechanic.as_str(), entry.location.as_str()))
        .collect::<Vec<_>>();
    writeln!(out, "unmapped mechanics examples {mechanic_sample:?}")?;

    writeln!(out)?;
    writeln!(out, "locations containing front/entrance keys:")?;
    for (name, keys) in rule_map.iter() {
        if keys.iter().any(|key| key == FRONT_DOOR_KEY || key == ENTRANCE_KEY) {
            writeln!(out, "{name} => {keys:?}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "locations requiring key items:")?;
    for (name, keys) in rule_map.iter() {
        if keys.iter().any(|key| is_key_item(key)) {
            writeln!(out, "{name} => {keys:?}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "B/C sides inheritable from A side:")?;
    for (other, a_side, keys) in inheritable_side_rules(rule_map, names) {
        writeln!(out, "{other} <= {a_side} {keys:?}")?;
    }

    let labels = outcome
        .unmapped_mechanics
        .iter()
        .map(|entry| entry.mechanic.as_str())
        .collect::<BTreeSet<_>>();
    writeln!(out)?;
    writeln!(out, "unmapped mechanic labels {}", labels.len())?;
    writeln!(out, "{labels:?}")?;

    Ok(summary)
}

fn is_key_item(key: &str) -> bool {
    key.starts_with("has") && key.contains("Key")
}
